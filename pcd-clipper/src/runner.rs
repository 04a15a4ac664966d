use pcd_core::{
    region::{keep_mask, ClipMode, PolygonSet},
    ClipError,
};
use pcd_exporter::writer::{PointSink, PointWriter};
use pcd_parser::reader::{ChunkedPointStream, PointReader};

use crate::progress::{NoProgress, ProgressReporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipSummary {
    pub chunks: u64,
    pub points_read: u64,
    pub points_kept: u64,
}

/// Streams a point cloud through the containment predicate chunk by chunk.
///
/// A pipeline runs once. Any error moves it to [`PipelineState::Failed`] and
/// is returned unchanged; the output must then be treated as invalid.
pub struct ClipPipeline<P: ProgressReporter = NoProgress> {
    chunk_size: usize,
    mode: ClipMode,
    progress: P,
    state: PipelineState,
}

impl<P: ProgressReporter> ClipPipeline<P> {
    pub fn new(chunk_size: usize, mode: ClipMode, progress: P) -> Result<Self, ClipError> {
        if chunk_size == 0 {
            return Err(ClipError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            chunk_size,
            mode,
            progress,
            state: PipelineState::Idle,
        })
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn mode(&self) -> ClipMode {
        self.mode
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn progress(&self) -> &P {
        &self.progress
    }

    pub fn run<R, S>(
        &mut self,
        polygons: &PolygonSet,
        reader: R,
        writer: &mut PointWriter<S>,
    ) -> Result<ClipSummary, ClipError>
    where
        R: PointReader,
        S: PointSink,
    {
        if self.state != PipelineState::Idle {
            return Err(ClipError::Config(format!(
                "pipeline cannot be restarted from state {:?}",
                self.state
            )));
        }

        self.state = PipelineState::Running;
        match self.process(polygons, reader, writer) {
            Ok(summary) => {
                self.state = PipelineState::Completed;
                self.progress.finish();
                Ok(summary)
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                self.progress.abandon();
                Err(e)
            }
        }
    }

    fn process<R, S>(
        &self,
        polygons: &PolygonSet,
        reader: R,
        writer: &mut PointWriter<S>,
    ) -> Result<ClipSummary, ClipError>
    where
        R: PointReader,
        S: PointSink,
    {
        let stream = ChunkedPointStream::new(reader, self.chunk_size)?;
        self.progress.start(stream.expected_chunks());

        let mut summary = ClipSummary::default();
        for chunk in stream {
            let chunk = chunk?;
            let mask = keep_mask(polygons, &chunk, self.mode);
            let read = chunk.len();
            let kept = writer.write_subset(chunk, &mask)?;

            summary.chunks += 1;
            summary.points_read += read as u64;
            summary.points_kept += kept as u64;
            log::debug!("chunk {}: kept {}/{} points", summary.chunks, kept, read);
            self.progress.advance(1);
        }

        writer.finalize()?;
        Ok(summary)
    }
}
