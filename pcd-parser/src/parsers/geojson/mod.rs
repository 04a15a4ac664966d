use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{GeoJson, Geometry, PolygonType, Value};
use pcd_core::{region::Region, ClipError};

/// Reads Polygon and MultiPolygon geometries from a GeoJSON document.
///
/// Each geometry becomes one region. Features without a geometry and
/// geometries of other types are skipped.
pub fn read_regions(path: &Path) -> Result<Vec<Region>, ClipError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ClipError::source_read(path, "read polygons from", e))?;
    let document: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| ClipError::source_read(path, "parse GeoJSON", e))?;

    let mut collector = Collector::default();
    match document {
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                match feature.geometry {
                    Some(geometry) => collector.visit(&geometry),
                    None => collector.skipped += 1,
                }
            }
        }
        GeoJson::Feature(feature) => match feature.geometry {
            Some(geometry) => collector.visit(&geometry),
            None => collector.skipped += 1,
        },
        GeoJson::Geometry(geometry) => collector.visit(&geometry),
    }

    if let Some(reason) = collector.invalid {
        return Err(ClipError::source_read(path, "parse GeoJSON", reason));
    }
    if collector.skipped > 0 {
        log::warn!(
            "skipped {} non-polygon geometries in {:?}",
            collector.skipped,
            path
        );
    }
    Ok(collector.regions)
}

#[derive(Default)]
struct Collector {
    regions: Vec<Region>,
    skipped: usize,
    invalid: Option<String>,
}

impl Collector {
    fn visit(&mut self, geometry: &Geometry) {
        match &geometry.value {
            Value::Polygon(rings) => match to_polygon(rings) {
                Ok(polygon) => self.regions.push(Region::from(polygon)),
                Err(reason) => self.invalid = Some(reason),
            },
            Value::MultiPolygon(polygons) if polygons.is_empty() => {
                self.invalid = Some("multipolygon without polygons".to_string());
            }
            Value::MultiPolygon(polygons) => {
                match polygons.iter().map(to_polygon).collect() {
                    Ok(parts) => self.regions.push(Region::from(MultiPolygon::new(parts))),
                    Err(reason) => self.invalid = Some(reason),
                }
            }
            Value::GeometryCollection(members) => {
                for member in members {
                    self.visit(member);
                }
            }
            _ => self.skipped += 1,
        }
    }
}

fn to_polygon(rings: &PolygonType) -> Result<Polygon<f64>, String> {
    let mut rings = rings.iter().map(|ring| {
        ring.iter()
            .map(|position| match position.as_slice() {
                [x, y, ..] => Ok(Coord { x: *x, y: *y }),
                _ => Err(format!(
                    "position with {} coordinates, expected at least 2",
                    position.len()
                )),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(LineString::new)
    });

    let exterior = rings
        .next()
        .ok_or_else(|| "polygon without an exterior ring".to_string())??;
    if exterior.0.is_empty() {
        return Err("polygon with an empty exterior ring".to_string());
    }
    let interiors = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}
