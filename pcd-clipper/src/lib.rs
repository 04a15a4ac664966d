pub mod builder;
pub mod job;
pub mod progress;
pub mod runner;

pub use builder::{ClipConfig, ClipConfigBuilder, DEFAULT_CHUNK_SIZE};
pub use job::clip_file;
pub use progress::{BatchProgressBar, NoProgress, ProgressReporter};
pub use runner::{ClipPipeline, ClipSummary, PipelineState};
