use std::{ffi::OsStr, path::Path};

use pcd_core::{
    region::{PolygonSet, Region},
    ClipError,
};

pub mod geojson;
pub mod shapefile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Shp,
    GeoJson,
}

pub fn get_extension(extension: &str) -> Option<Extension> {
    match extension.to_ascii_lowercase().as_str() {
        "shp" => Some(Extension::Shp),
        "geojson" | "json" => Some(Extension::GeoJson),
        _ => None,
    }
}

/// Loads every polygon of a vector file, in file order.
///
/// A file without any polygon geometry is an error.
pub fn load_polygon_set(path: impl AsRef<Path>) -> Result<PolygonSet, ClipError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(OsStr::to_str)
        .and_then(get_extension)
        .ok_or_else(|| {
            ClipError::source_read(
                path,
                "load polygons from",
                "unsupported polygon format (expected .shp, .geojson or .json)",
            )
        })?;

    let regions: Vec<Region> = match extension {
        Extension::Shp => self::shapefile::read_regions(path)?,
        Extension::GeoJson => self::geojson::read_regions(path)?,
    };

    if regions.is_empty() {
        return Err(ClipError::source_read(
            path,
            "load polygons from",
            "no polygon geometries found",
        ));
    }

    let polygons = PolygonSet::new(regions);
    log::info!("loaded {} polygons from {:?}", polygons.len(), path);
    if let Some(bounds) = polygons.bounds() {
        log::debug!(
            "polygon extent: ({}, {}) - ({}, {})",
            bounds.min().x,
            bounds.min().y,
            bounds.max().x,
            bounds.max().y
        );
    }
    Ok(polygons)
}
