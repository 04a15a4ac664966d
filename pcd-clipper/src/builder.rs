use std::path::{Path, PathBuf};

use pcd_core::{region::ClipMode, ClipError};

pub const DEFAULT_CHUNK_SIZE: usize = 100_000;

/// Validated settings of a file-to-file clip.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub polygons: PathBuf,
    pub chunk_size: usize,
    pub mode: ClipMode,
}

#[derive(Debug, Clone)]
pub struct ClipConfigBuilder {
    input: PathBuf,
    output: PathBuf,
    polygons: PathBuf,
    chunk_size: usize,
    external: bool,
    intersection: bool,
}

impl ClipConfigBuilder {
    pub fn new(
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        polygons: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            polygons: polygons.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            external: false,
            intersection: false,
        }
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }

    pub fn intersection(mut self, intersection: bool) -> Self {
        self.intersection = intersection;
        self
    }

    /// Checks everything that can be checked without opening the files.
    pub fn build(self) -> Result<ClipConfig, ClipError> {
        if self.chunk_size == 0 {
            return Err(ClipError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if same_path(&self.input, &self.output) {
            return Err(ClipError::Config(format!(
                "output {:?} would overwrite the input",
                self.output
            )));
        }

        Ok(ClipConfig {
            input: self.input,
            output: self.output,
            polygons: self.polygons,
            chunk_size: self.chunk_size,
            mode: ClipMode::from_flags(self.intersection, self.external),
        })
    }
}

/// Whether both paths name the same file once `..`, `.` and symlinks are
/// resolved. An output that does not exist yet is resolved through its parent.
fn same_path(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    let Ok(input) = input.canonicalize() else {
        return false;
    };
    if let Ok(output) = output.canonicalize() {
        return input == output;
    }
    let (Some(parent), Some(name)) = (output.parent(), output.file_name()) else {
        return false;
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    parent
        .canonicalize()
        .map(|parent| parent.join(name) == input)
        .unwrap_or(false)
}
