//! # Terrain Import — SRTM HGT Tiles
//!
//! Loads SRTM HGT elevation files into [`Heightmap`]s for the terrain
//! mesh builder.
//!
//! SRTM tiles are 1°×1° cells named by their SW corner (e.g. `N52E013.hgt`),
//! stored as big-endian i16 samples, row 0 at the north edge.
//!
//! ## Table of Contents
//! 1. HGT resolution detection
//! 2. HGT tile parsing
//! 3. Errors

use std::path::{Path, PathBuf};

use crate::error::GeoMeshError;
use crate::heightmap::Heightmap;

/// Sample value marking a data void
const HGT_VOID: i16 = -32768;

// ============================================================================
// 1. HGT resolution detection
// ============================================================================

/// SRTM resolution variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrtmResolution {
    /// 1 arc-second (~30m) — 3601×3601 samples per tile
    OneArcSecond,
    /// 3 arc-second (~90m) — 1201×1201 samples per tile
    ThreeArcSecond,
}

impl SrtmResolution {
    /// Samples per side for this resolution
    pub fn samples_per_side(&self) -> usize {
        match self {
            SrtmResolution::OneArcSecond => 3601,
            SrtmResolution::ThreeArcSecond => 1201,
        }
    }

    /// Detect resolution from the raw file size
    pub fn from_byte_len(len: usize) -> Option<Self> {
        [SrtmResolution::OneArcSecond, SrtmResolution::ThreeArcSecond]
            .into_iter()
            .find(|r| r.samples_per_side() * r.samples_per_side() * 2 == len)
    }
}

// ============================================================================
// 2. HGT tile parsing
// ============================================================================

/// Parsed SRTM HGT tile
#[derive(Debug, Clone)]
pub struct HgtTile {
    /// SW corner latitude (integer degrees)
    pub lat: i32,
    /// SW corner longitude (integer degrees)
    pub lon: i32,
    /// Resolution (1" or 3")
    pub resolution: SrtmResolution,
    /// Elevations in meters, row-major from the NW corner; voids read as 0
    pub heightmap: Heightmap,
}

impl HgtTile {
    /// Parse an SRTM HGT file from disk
    pub fn load(path: &Path) -> Result<Self, TerrainImportError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                TerrainImportError::Parse(path.to_path_buf(), "Invalid HGT filename".to_string())
            })?;
        let data =
            std::fs::read(path).map_err(|e| TerrainImportError::Io(path.to_path_buf(), e))?;

        let tile = Self::from_bytes(name, &data).map_err(|e| match e {
            TerrainImportError::Parse(_, msg) => TerrainImportError::Parse(path.to_path_buf(), msg),
            other => other,
        })?;

        tracing::info!(
            "Loaded HGT tile {} ({:?}, {} samples)",
            path.display(),
            tile.resolution,
            tile.heightmap.samples().len()
        );
        Ok(tile)
    }

    /// Parse HGT bytes; `name` is the file stem encoding the SW corner
    pub fn from_bytes(name: &str, data: &[u8]) -> Result<Self, TerrainImportError> {
        let (lat, lon) = parse_hgt_filename(name).ok_or_else(|| {
            TerrainImportError::Parse(
                PathBuf::from(name),
                format!("Cannot parse lat/lon from filename: {name}"),
            )
        })?;

        let resolution = SrtmResolution::from_byte_len(data.len()).ok_or_else(|| {
            TerrainImportError::Parse(
                PathBuf::from(name),
                format!(
                    "Unexpected HGT file size: {} bytes (expected 25934402 or 2884802)",
                    data.len()
                ),
            )
        })?;

        let samples = data
            .chunks_exact(2)
            .map(|pair| match i16::from_be_bytes([pair[0], pair[1]]) {
                HGT_VOID => 0.0,
                value => value as f32,
            })
            .collect();

        let side = resolution.samples_per_side();
        let heightmap = Heightmap::from_samples(side, side, samples)?;
        Ok(HgtTile { lat, lon, resolution, heightmap })
    }
}

/// Parse SRTM filename like "N52E013" → (52, 13)
pub fn parse_hgt_filename(name: &str) -> Option<(i32, i32)> {
    if name.len() < 7 || !name.is_ascii() {
        return None;
    }
    let name = name.to_uppercase();

    let lat_sign = match name.as_bytes()[0] {
        b'N' => 1,
        b'S' => -1,
        _ => return None,
    };
    let lat: i32 = name[1..3].parse().ok()?;

    let lon_sign = match name.as_bytes()[3] {
        b'E' => 1,
        b'W' => -1,
        _ => return None,
    };
    let lon: i32 = name[4..7].parse().ok()?;

    Some((lat * lat_sign, lon * lon_sign))
}

// ============================================================================
// 3. Errors
// ============================================================================

/// Errors from terrain import
#[derive(Debug, thiserror::Error)]
pub enum TerrainImportError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("Failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, String),

    #[error(transparent)]
    Heightmap(#[from] GeoMeshError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_arc_second_bytes(fill: i16) -> Vec<u8> {
        let side = SrtmResolution::ThreeArcSecond.samples_per_side();
        fill.to_be_bytes().repeat(side * side)
    }

    #[test]
    fn test_parse_hgt_filename() {
        assert_eq!(parse_hgt_filename("N52E013"), Some((52, 13)));
        assert_eq!(parse_hgt_filename("s33w071"), Some((-33, -71)));
        assert_eq!(parse_hgt_filename("X52E013"), None);
        assert_eq!(parse_hgt_filename("N52"), None);
    }

    #[test]
    fn test_resolution_from_size() {
        assert_eq!(
            SrtmResolution::from_byte_len(2_884_802),
            Some(SrtmResolution::ThreeArcSecond)
        );
        assert_eq!(
            SrtmResolution::from_byte_len(25_934_402),
            Some(SrtmResolution::OneArcSecond)
        );
        assert_eq!(SrtmResolution::from_byte_len(100), None);
    }

    #[test]
    fn test_from_bytes() {
        let mut data = three_arc_second_bytes(120);
        data[0..2].copy_from_slice(&HGT_VOID.to_be_bytes());

        let tile = HgtTile::from_bytes("N52E013", &data).unwrap();
        assert_eq!((tile.lat, tile.lon), (52, 13));
        assert_eq!(tile.heightmap.width(), 1201);
        assert_eq!(tile.heightmap.get(0, 0), 0.0);
        assert_eq!(tile.heightmap.get(1, 0), 120.0);
    }

    #[test]
    fn test_from_bytes_rejects_bad_size() {
        let err = HgtTile::from_bytes("N52E013", &[0u8; 10]).unwrap_err();
        assert!(matches!(err, TerrainImportError::Parse(_, _)));
        assert!(err.to_string().starts_with("Failed to parse N52E013: Unexpected HGT file size"));
    }

    #[test]
    fn test_heightmap_error_converts() {
        let err = TerrainImportError::from(GeoMeshError::InvalidInput("bad".to_string()));
        assert!(matches!(err, TerrainImportError::Heightmap(_)));
        assert_eq!(err.to_string(), "Invalid input: bad");
    }

    #[test]
    fn test_load_missing_file() {
        let err = HgtTile::load(Path::new("/nonexistent/N52E013.hgt")).unwrap_err();
        assert!(matches!(err, TerrainImportError::Io(_, _)));
    }
}
