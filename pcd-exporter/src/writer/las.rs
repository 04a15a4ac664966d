use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use las::{Header, Writer};
use pcd_core::{pointcloud::point::PointRecord, ClipError};

use super::PointSink;

/// Writes a LAS file, or LAZ when the path ends in `.laz`, with the header of
/// the input it was created from.
///
/// Point counts and bounds are patched into the header by `finalize`.
pub struct LasPointSink {
    path: PathBuf,
    writer: Option<Writer<BufWriter<File>>>,
}

impl LasPointSink {
    pub fn create(path: impl AsRef<Path>, header: &Header) -> Result<Self, ClipError> {
        let path = path.as_ref().to_path_buf();
        let writer = Writer::from_path(&path, header.clone())
            .map_err(|e| ClipError::sink_write(&path, "create", e))?;
        log::debug!("created {:?}", path);
        Ok(Self {
            path,
            writer: Some(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the writer if it is still open and removes the file.
    pub fn discard(mut self) -> io::Result<()> {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = close(writer) {
                log::debug!("closing discarded {:?} failed: {}", self.path, e);
            }
        }
        std::fs::remove_file(&self.path)
    }
}

/// `las::Writer` closes itself on drop and panics if that fails, so a writer
/// whose `close` failed must never be dropped.
fn close(mut writer: Writer<BufWriter<File>>) -> Result<(), las::Error> {
    match writer.close() {
        Ok(()) => Ok(()),
        Err(e) => {
            std::mem::forget(writer);
            Err(e)
        }
    }
}

impl PointSink for LasPointSink {
    fn write_point(&mut self, point: PointRecord) -> Result<(), ClipError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ClipError::sink_write(&self.path, "write to", "writer is closed"))?;
        writer
            .write_point(point)
            .map_err(|e| ClipError::sink_write(&self.path, "write point to", e))
    }

    fn finalize(&mut self) -> Result<(), ClipError> {
        let writer = self
            .writer
            .take()
            .ok_or_else(|| ClipError::sink_write(&self.path, "close", "writer is closed"))?;
        close(writer).map_err(|e| ClipError::sink_write(&self.path, "close", e))
    }
}
