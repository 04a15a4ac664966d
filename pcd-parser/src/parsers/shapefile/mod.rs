use std::path::Path;

use geo::{
    coordinate_position::{CoordPos, CoordinatePosition},
    Coord, LineString, MultiPolygon, Polygon,
};
use pcd_core::{region::Region, ClipError};
use shapefile::{PolygonRing, Shape};

/// Reads the polygon records of an ESRI Shapefile.
///
/// Every Polygon, PolygonM or PolygonZ record becomes one region; M and Z
/// values are dropped. Other shape types are skipped.
pub fn read_regions(path: &Path) -> Result<Vec<Region>, ClipError> {
    let shapes = shapefile::read_shapes(path)
        .map_err(|e| ClipError::source_read(path, "read shapefile", e.to_string()))?;

    let mut regions = Vec::with_capacity(shapes.len());
    let mut skipped = 0;
    for shape in shapes {
        let region = match shape {
            Shape::Polygon(polygon) => assemble(polygon.rings(), |p| Coord { x: p.x, y: p.y }),
            Shape::PolygonM(polygon) => assemble(polygon.rings(), |p| Coord { x: p.x, y: p.y }),
            Shape::PolygonZ(polygon) => assemble(polygon.rings(), |p| Coord { x: p.x, y: p.y }),
            _ => {
                skipped += 1;
                continue;
            }
        };
        regions.push(region);
    }

    if skipped > 0 {
        log::warn!("skipped {} non-polygon shapes in {:?}", skipped, path);
    }
    Ok(regions)
}

/// Groups the rings of one record into polygons.
///
/// An inner ring belongs to the first outer ring that contains its first
/// vertex, or to the last outer ring if none does. Inner rings of a record
/// without outer rings are used as outer rings.
fn assemble<P>(rings: &[PolygonRing<P>], coord: impl Fn(&P) -> Coord<f64>) -> Region {
    let to_line = |points: &[P]| LineString::new(points.iter().map(&coord).collect());

    let mut shells: Vec<Polygon<f64>> = rings
        .iter()
        .filter_map(|ring| match ring {
            PolygonRing::Outer(points) => Some(Polygon::new(to_line(points.as_slice()), vec![])),
            PolygonRing::Inner(_) => None,
        })
        .collect();
    let inners = rings.iter().filter_map(|ring| match ring {
        PolygonRing::Inner(points) => Some(to_line(points.as_slice())),
        PolygonRing::Outer(_) => None,
    });

    if shells.is_empty() {
        let shells = inners.map(|ring| Polygon::new(ring, vec![])).collect();
        return Region::from(MultiPolygon::new(shells));
    }

    // Ownership is decided against the bare outlines, before any hole is cut.
    let outlines = shells.clone();
    for ring in inners {
        let owner = ring
            .0
            .first()
            .and_then(|first| {
                outlines
                    .iter()
                    .position(|outline| outline.coordinate_position(first) != CoordPos::Outside)
            })
            .unwrap_or(shells.len() - 1);
        shells[owner].interiors_push(ring);
    }

    Region::from(MultiPolygon::new(shells))
}
