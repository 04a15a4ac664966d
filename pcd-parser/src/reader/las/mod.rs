use std::path::{Path, PathBuf};

use las::{Header, Reader};
use pcd_core::{pointcloud::point::PointRecord, ClipError};

use super::PointReader;

/// Reads LAS and LAZ files record by record.
pub struct LasPointReader {
    path: PathBuf,
    reader: Reader,
}

impl LasPointReader {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClipError> {
        let path = path.as_ref().to_path_buf();
        let reader = Reader::from_path(&path)
            .map_err(|e| ClipError::source_read(&path, "open point cloud", e))?;
        log::debug!(
            "opened {:?}: LAS {:?}, {} points",
            path,
            reader.header().version(),
            reader.header().number_of_points()
        );
        Ok(Self { path, reader })
    }

    pub fn header(&self) -> &Header {
        self.reader.header()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PointReader for LasPointReader {
    fn total_count(&self) -> u64 {
        self.reader.header().number_of_points()
    }

    fn next_point(&mut self) -> Result<Option<PointRecord>, ClipError> {
        self.reader
            .points()
            .next()
            .transpose()
            .map_err(|e| ClipError::source_read(&self.path, "read point from", e))
    }
}
