//! # Reference Frames
//!
//! Maps double-precision geographic or projected coordinates into
//! single-precision scene-local positions without visible jitter.
//!
//! ## Pipeline
//! ```text
//! Geographic (WGS84)   →  Local (Bevy meters, Y-up)
//!   lon/lat degrees        x/z meters from origin, north = -Z
//! Projected (planar)   →  Local (Bevy meters, Y-up)
//!   x/y meters             plain subtraction + axis remap
//! ```
//!
//! Local positions are only meaningful together with the origin that
//! produced them. The equirectangular approximation loses accuracy with the
//! square of the angular distance, so keep the origin within ~50 km of the
//! working area. Nothing here signals that degradation.
//!
//! ## Table of Contents
//! 1. ReferenceOrigin — Scene coordinate origin
//! 2. Equirectangular local transforms
//! 3. Spherical Web-Mercator
//! 4. Slippy-map tile bounds

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, GeoMeshError, Result};

// ============================================================================
// 1. ReferenceOrigin — Scene coordinate origin
// ============================================================================

/// WGS84 equatorial meridian arc length per degree, in meters
pub const METERS_PER_DEGREE: f64 = 111_319.491;

/// Unit system of the origin's coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    /// Longitude/latitude in degrees
    #[default]
    Geographic,
    /// Planar coordinates already in meters (e.g. Web-Mercator, UTM)
    Projected,
}

/// The double-precision anchor that defines the scene's (0, 0, 0).
///
/// Immutable: any mesh baked against one origin is invalid under another,
/// so a new origin is a new value.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
pub struct ReferenceOrigin {
    x: f64,
    y: f64,
    kind: OriginKind,
}

impl ReferenceOrigin {
    /// Create an origin, rejecting non-finite coordinates.
    ///
    /// `x`/`y` are longitude/latitude for geographic origins, easting/northing
    /// for projected ones.
    pub fn new(x: f64, y: f64, kind: OriginKind) -> Result<Self> {
        ensure_finite("origin coordinates", &[x, y])?;
        Ok(Self { x, y, kind })
    }

    /// Geographic origin at `lon`/`lat` degrees
    pub fn geographic(lon: f64, lat: f64) -> Result<Self> {
        Self::new(lon, lat, OriginKind::Geographic)
    }

    /// Projected origin at planar `x`/`y` meters
    pub fn projected(x: f64, y: f64) -> Result<Self> {
        Self::new(x, y, OriginKind::Projected)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn kind(&self) -> OriginKind {
        self.kind
    }

    /// Convert absolute coordinates to a scene-local position.
    ///
    /// Axis mapping: (X=East, Y=North) → Bevy (X=East, Y=Up, Z=South)
    pub fn to_local(&self, x: f64, y: f64, elevation: f32) -> Vec3 {
        let (east, north) = match self.kind {
            OriginKind::Geographic => equirectangular_to_local(x, y, self),
            OriginKind::Projected => (x - self.x, y - self.y),
        };
        Vec3::new(east as f32, elevation, -(north as f32))
    }

    /// Inverse of [`Self::to_local`]: recover absolute coordinates
    pub fn to_geographic(&self, local: Vec3) -> (f64, f64) {
        let east = local.x as f64;
        let north = -(local.z as f64);
        match self.kind {
            OriginKind::Geographic => local_to_equirectangular(east, north, self),
            OriginKind::Projected => (self.x + east, self.y + north),
        }
    }
}

// ============================================================================
// 2. Equirectangular local transforms
// ============================================================================

/// Direction along which a degree is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// North-south (along a meridian)
    Latitude,
    /// East-west (along a parallel)
    Longitude,
}

/// Meters spanned by one degree at `latitude` (degrees) in the given direction
pub fn meters_per_degree(direction: Direction, latitude: f64) -> f64 {
    match direction {
        Direction::Latitude => METERS_PER_DEGREE,
        Direction::Longitude => METERS_PER_DEGREE * latitude.to_radians().cos(),
    }
}

/// Geographic → local (east, north) meters relative to a geographic origin
pub fn equirectangular_to_local(lon: f64, lat: f64, origin: &ReferenceOrigin) -> (f64, f64) {
    let east = (lon - origin.x) * meters_per_degree(Direction::Longitude, origin.y);
    let north = (lat - origin.y) * METERS_PER_DEGREE;
    (east, north)
}

/// Local (east, north) meters → geographic lon/lat
pub fn local_to_equirectangular(east: f64, north: f64, origin: &ReferenceOrigin) -> (f64, f64) {
    let lon = origin.x + east / meters_per_degree(Direction::Longitude, origin.y);
    let lat = origin.y + north / METERS_PER_DEGREE;
    (lon, lat)
}

// ============================================================================
// 3. Spherical Web-Mercator
// ============================================================================

/// Sphere radius used by EPSG:3857
pub const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude beyond which Web-Mercator is undefined in practice
pub const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// Half the width of the Web-Mercator plane in meters
pub const WEB_MERCATOR_EXTENT: f64 = std::f64::consts::PI * WEB_MERCATOR_RADIUS;

/// Longitude/latitude degrees → Web-Mercator meters (latitude clamped)
pub fn lonlat_to_web_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
    let x = lon.to_radians() * WEB_MERCATOR_RADIUS;
    let y = (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln() * WEB_MERCATOR_RADIUS;
    (x, y)
}

/// Web-Mercator meters → longitude/latitude degrees
pub fn web_mercator_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WEB_MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2)
        .to_degrees();
    (lon, lat)
}

// ============================================================================
// 4. Slippy-map tile bounds
// ============================================================================

/// An XYZ map tile address (row 0 at the north edge)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

/// Web-Mercator envelope of a tile in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// Web-Mercator bounds of an XYZ tile
pub fn tile_bounds(tile: TileId) -> Result<TileBounds> {
    if tile.zoom > 30 {
        return Err(GeoMeshError::invalid(format!("zoom {} exceeds 30", tile.zoom)));
    }
    let tiles_per_side = 1u64 << tile.zoom;
    if u64::from(tile.x) >= tiles_per_side || u64::from(tile.y) >= tiles_per_side {
        return Err(GeoMeshError::invalid(format!(
            "tile {}/{}/{} outside 0..{}",
            tile.zoom, tile.x, tile.y, tiles_per_side
        )));
    }

    let size = 2.0 * WEB_MERCATOR_EXTENT / tiles_per_side as f64;
    let min_x = -WEB_MERCATOR_EXTENT + tile.x as f64 * size;
    let max_y = WEB_MERCATOR_EXTENT - tile.y as f64 * size;
    Ok(TileBounds {
        min_x,
        min_y: max_y - size,
        max_x: min_x + size,
        max_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_rejects_non_finite() {
        assert!(ReferenceOrigin::geographic(f64::NAN, 52.0).is_err());
        assert!(ReferenceOrigin::projected(0.0, f64::NEG_INFINITY).is_err());
        let origin = ReferenceOrigin::geographic(13.0, 52.0).unwrap();
        assert_eq!((origin.x(), origin.y()), (13.0, 52.0));
        assert_eq!(origin.kind(), OriginKind::Geographic);
    }

    #[test]
    fn test_berlin_offset_east() {
        let origin = ReferenceOrigin::geographic(13.0, 52.0).unwrap();
        let local = origin.to_local(13.001, 52.0, 0.0);

        let expected = 0.001 * METERS_PER_DEGREE * 52f64.to_radians().cos();
        assert!((local.x as f64 - expected).abs() < 1e-3);
        assert!(local.x > 68.0 && local.x < 69.0);
        assert_eq!(local.y, 0.0);
        assert!(local.z.abs() < 1e-6);
    }

    #[test]
    fn test_north_is_negative_z() {
        let origin = ReferenceOrigin::geographic(13.0, 52.0).unwrap();
        let local = origin.to_local(13.0, 52.01, 7.5);
        assert!(local.z < 0.0);
        assert!((local.z as f64 + 0.01 * METERS_PER_DEGREE).abs() < 1e-2);
        assert_eq!(local.y, 7.5);
    }

    #[test]
    fn test_geographic_round_trip_within_50km() {
        let origin = ReferenceOrigin::geographic(13.0, 52.0).unwrap();
        let meters_per_lon = meters_per_degree(Direction::Longitude, 52.0);
        for &(dlon, dlat) in &[(0.3, 0.2), (-0.4, 0.1), (0.05, -0.44), (-0.6, -0.3), (0.0, 0.0)] {
            let (lon, lat) = (13.0 + dlon, 52.0 + dlat);
            let local = origin.to_local(lon, lat, 0.0);
            let (back_lon, back_lat) = origin.to_geographic(local);

            let err_east = (back_lon - lon).abs() * meters_per_lon;
            let err_north = (back_lat - lat).abs() * METERS_PER_DEGREE;
            assert!(err_east < 1.0, "east error {err_east} m");
            assert!(err_north < 1.0, "north error {err_north} m");
        }
    }

    #[test]
    fn test_projected_is_plain_subtraction() {
        let origin = ReferenceOrigin::projected(500_000.0, 5_760_000.0).unwrap();
        let local = origin.to_local(500_120.5, 5_759_990.0, 3.0);
        assert_eq!(local, Vec3::new(120.5, 3.0, 10.0));
        assert_eq!(origin.to_geographic(local), (500_120.5, 5_759_990.0));
    }

    #[test]
    fn test_meters_per_degree() {
        assert_eq!(meters_per_degree(Direction::Latitude, 60.0), METERS_PER_DEGREE);
        let half = meters_per_degree(Direction::Longitude, 60.0);
        assert!((half - METERS_PER_DEGREE * 0.5).abs() < 1e-6);
        assert!((meters_per_degree(Direction::Longitude, 0.0) - METERS_PER_DEGREE).abs() < 1e-9);
    }

    #[test]
    fn test_web_mercator_round_trip() {
        let (x, y) = lonlat_to_web_mercator(13.4, 52.5);
        let (lon, lat) = web_mercator_to_lonlat(x, y);
        assert!((lon - 13.4).abs() < 1e-9);
        assert!((lat - 52.5).abs() < 1e-9);

        let (_, y_pole) = lonlat_to_web_mercator(0.0, 90.0);
        assert!((y_pole - WEB_MERCATOR_EXTENT).abs() < 1.0);
    }

    #[test]
    fn test_tile_bounds() {
        let world = tile_bounds(TileId { zoom: 0, x: 0, y: 0 }).unwrap();
        assert_eq!(world.min_x, -WEB_MERCATOR_EXTENT);
        assert_eq!(world.max_y, WEB_MERCATOR_EXTENT);
        assert!((world.max_x - WEB_MERCATOR_EXTENT).abs() < 1e-6);

        let ne = tile_bounds(TileId { zoom: 1, x: 1, y: 0 }).unwrap();
        assert!(ne.min_x.abs() < 1e-6 && ne.min_y.abs() < 1e-6);

        assert!(tile_bounds(TileId { zoom: 1, x: 2, y: 0 }).is_err());
        assert!(tile_bounds(TileId { zoom: 31, x: 0, y: 0 }).is_err());
    }
}
