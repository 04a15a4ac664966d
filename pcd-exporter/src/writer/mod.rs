pub mod las;

use pcd_core::{
    pointcloud::point::{Chunk, PointRecord},
    ClipError,
};

/// Destination of the kept records.
pub trait PointSink {
    fn write_point(&mut self, point: PointRecord) -> Result<(), ClipError>;

    /// Flushes buffered records and completes the destination.
    fn finalize(&mut self) -> Result<(), ClipError>;
}

impl PointSink for Vec<PointRecord> {
    fn write_point(&mut self, point: PointRecord) -> Result<(), ClipError> {
        self.push(point);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), ClipError> {
        Ok(())
    }
}

/// Appends the masked subset of each chunk to a [`PointSink`].
pub struct PointWriter<S: PointSink> {
    sink: S,
    written: u64,
}

impl<S: PointSink> PointWriter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, written: 0 }
    }

    /// Writes, in chunk order, the points whose mask entry is `true`.
    /// Returns how many were written.
    pub fn write_subset(&mut self, points: Chunk, keep_mask: &[bool]) -> Result<usize, ClipError> {
        if points.len() != keep_mask.len() {
            return Err(ClipError::MaskLength {
                points: points.len(),
                mask: keep_mask.len(),
            });
        }

        let mut kept = 0;
        for (point, &keep) in points.into_iter().zip(keep_mask) {
            if keep {
                self.sink.write_point(point)?;
                kept += 1;
            }
        }
        self.written += kept as u64;
        Ok(kept)
    }

    pub fn finalize(&mut self) -> Result<u64, ClipError> {
        self.sink.finalize()?;
        Ok(self.written)
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
