use geo::{
    coordinate_position::{CoordPos, CoordinatePosition},
    BoundingRect, Coord, MultiPolygon, Polygon, Rect,
};

use crate::pointcloud::point::Position;

/// One member of a [`PolygonSet`]: a polygon, or the union of the parts of a
/// multi-part record. Holes are carried by the polygons themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    shape: MultiPolygon<f64>,
    bounds: Option<Rect<f64>>,
}

impl Region {
    pub fn new(shape: MultiPolygon<f64>) -> Self {
        let bounds = shape.bounding_rect();
        Self { shape, bounds }
    }

    pub fn shape(&self) -> &MultiPolygon<f64> {
        &self.shape
    }

    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    /// Points on an edge, including the edge of a hole, are contained.
    pub fn contains(&self, position: Position) -> bool {
        let Some(bounds) = self.bounds else {
            return false;
        };
        let (min, max) = (bounds.min(), bounds.max());
        if position.x < min.x || position.x > max.x || position.y < min.y || position.y > max.y {
            return false;
        }

        // Parts are tested one by one: the multi-geometry rule counts a point
        // on an edge shared by two parts as outside.
        let coord = Coord::from(position);
        self.shape.0.iter().any(|polygon| {
            matches!(
                polygon.coordinate_position(&coord),
                CoordPos::Inside | CoordPos::OnBoundary
            )
        })
    }
}

impl From<Polygon<f64>> for Region {
    fn from(polygon: Polygon<f64>) -> Self {
        Self::new(MultiPolygon::new(vec![polygon]))
    }
}

impl From<MultiPolygon<f64>> for Region {
    fn from(shape: MultiPolygon<f64>) -> Self {
        Self::new(shape)
    }
}

/// Ordered, immutable collection of regions a point cloud is clipped against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSet {
    regions: Vec<Region>,
}

impl PolygonSet {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn polygons(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Bounding box of every region together, if any region is non-empty.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.regions
            .iter()
            .filter_map(Region::bounds)
            .reduce(|acc, rect| {
                Rect::new(
                    Coord {
                        x: acc.min().x.min(rect.min().x),
                        y: acc.min().y.min(rect.min().y),
                    },
                    Coord {
                        x: acc.max().x.max(rect.max().x),
                        y: acc.max().y.max(rect.max().y),
                    },
                )
            })
    }
}

impl FromIterator<Region> for PolygonSet {
    fn from_iter<I: IntoIterator<Item = Region>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
