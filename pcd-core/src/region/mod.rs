pub mod containment;
pub mod polygon;

pub use containment::{evaluate, keep_mask, ClipMode, Combination, Selection};
pub use polygon::{PolygonSet, Region};
