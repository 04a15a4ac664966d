pub mod error;
pub mod pointcloud;
pub mod region;

pub use error::{BoxError, ClipError};
