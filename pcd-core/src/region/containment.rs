use std::fmt;

use rayon::iter::{IntoParallelRefIterator as _, ParallelIterator as _};

use crate::pointcloud::point::{KeepMask, PointRecord, Position};
use crate::region::polygon::PolygonSet;

/// How the per-region containment results are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combination {
    /// Inside at least one region (union).
    #[default]
    Any,
    /// Inside every region (intersection). Vacuously true for an empty set.
    All,
}

/// Which side of the combined region is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Inside,
    Outside,
}

impl Selection {
    /// Turns "is the point in the combined region" into "is the point kept".
    pub fn apply(self, in_region: bool) -> bool {
        match self {
            Selection::Inside => in_region,
            Selection::Outside => !in_region,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipMode {
    pub combination: Combination,
    pub selection: Selection,
}

impl ClipMode {
    pub fn from_flags(intersection: bool, external: bool) -> Self {
        Self {
            combination: if intersection {
                Combination::All
            } else {
                Combination::Any
            },
            selection: if external {
                Selection::Outside
            } else {
                Selection::Inside
            },
        }
    }

    pub fn is_intersection(&self) -> bool {
        self.combination == Combination::All
    }

    pub fn is_external(&self) -> bool {
        self.selection == Selection::Outside
    }
}

impl fmt::Display for ClipMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.selection {
            Selection::Inside => "inside",
            Selection::Outside => "outside",
        };
        let region = match self.combination {
            Combination::Any => "any polygon",
            Combination::All => "all polygons",
        };
        write!(f, "keep points {side} {region}")
    }
}

/// Decides whether the point at `(x, y)` is kept.
pub fn evaluate(polygons: &PolygonSet, x: f64, y: f64, mode: ClipMode) -> bool {
    let position = Position::new(x, y);
    let regions = polygons.polygons();
    let in_region = match mode.combination {
        Combination::Any => regions.iter().any(|region| region.contains(position)),
        Combination::All => regions.iter().all(|region| region.contains(position)),
    };
    mode.selection.apply(in_region)
}

/// Evaluates every record of a chunk. Entries are in chunk order.
pub fn keep_mask(polygons: &PolygonSet, chunk: &[PointRecord], mode: ClipMode) -> KeepMask {
    chunk
        .par_iter()
        .map(|point| evaluate(polygons, point.x, point.y, mode))
        .collect()
}
