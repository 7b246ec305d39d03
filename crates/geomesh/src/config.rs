//! # Geospatial Mesh Configuration
//!
//! Parses `geo.toml`: the scene origin plus default parameters for terrain
//! and vector meshing.
//!
//! ```toml
//! [origin]
//! kind = "geographic"
//! x = 13.405
//! y = 52.52
//! name = "Berlin Mitte"
//!
//! [terrain]
//! scale_x = 30.0
//! scale_z = 30.0
//! vertical_exaggeration = 1.5
//!
//! [vector]
//! line_width = 6.0
//! ```
//!
//! ## Table of Contents
//! 1. GeoMeshConfig — Top-level config
//! 2. Section configs
//! 3. Parsing

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::coords::{OriginKind, ReferenceOrigin};
use crate::error::GeoMeshError;

// ============================================================================
// 1. GeoMeshConfig — Top-level config
// ============================================================================

/// Top-level configuration, parsed from `geo.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoMeshConfig {
    /// Scene origin
    pub origin: OriginConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
    #[serde(default)]
    pub vector: VectorConfig,
}

// ============================================================================
// 2. Section configs
// ============================================================================

/// Scene origin — all local coords are relative to this
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginConfig {
    #[serde(default)]
    pub kind: OriginKind,
    /// Longitude (geographic) or easting (projected)
    pub x: f64,
    /// Latitude (geographic) or northing (projected)
    pub y: f64,
    /// Human-readable name for the origin point
    #[serde(default)]
    pub name: String,
}

/// Terrain meshing defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// Grid spacing along X in world units (meters)
    #[serde(default = "default_one")]
    pub scale_x: f32,
    /// Grid spacing along Z in world units (meters)
    #[serde(default = "default_one")]
    pub scale_z: f32,
    /// Cell size used for normal estimation
    #[serde(default = "default_one")]
    pub cell_size: f32,
    /// Vertical exaggeration for visibility (1.0 = no exaggeration)
    #[serde(default = "default_one")]
    pub vertical_exaggeration: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_z: 1.0,
            cell_size: 1.0,
            vertical_exaggeration: 1.0,
        }
    }
}

/// Vector meshing defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Ribbon width in world units (for LineString features)
    #[serde(default = "default_width")]
    pub line_width: f32,
    /// Elevation at which polygons are laid out
    #[serde(default)]
    pub polygon_elevation: f32,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            line_width: default_width(),
            polygon_elevation: 0.0,
        }
    }
}

fn default_one() -> f32 { 1.0 }
fn default_width() -> f32 { 10.0 }

// ============================================================================
// 3. Parsing
// ============================================================================

impl GeoMeshConfig {
    /// Load from a `geo.toml` file path
    pub fn load(path: &Path) -> Result<Self, GeoConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GeoConfigError::Io(path.to_path_buf(), e))?;
        let config: GeoMeshConfig =
            toml::from_str(&content).map_err(|e| GeoConfigError::Parse(path.to_path_buf(), e))?;
        tracing::info!(
            "Loaded {} (origin {:?} {}, {})",
            path.display(),
            config.origin.kind,
            config.origin.x,
            config.origin.y
        );
        Ok(config)
    }

    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, GeoConfigError> {
        toml::from_str(content).map_err(|e| GeoConfigError::Parse(PathBuf::from("<string>"), e))
    }

    /// Build the configured reference origin
    pub fn origin(&self) -> Result<ReferenceOrigin, GeoConfigError> {
        Ok(ReferenceOrigin::new(self.origin.x, self.origin.y, self.origin.kind)?)
    }

    /// Resolve a path relative to the directory holding geo.toml
    pub fn resolve_path(&self, geo_toml_dir: &Path, relative: &str) -> PathBuf {
        geo_toml_dir.join(relative)
    }
}

/// Errors from loading geo.toml
#[derive(Debug, thiserror::Error)]
pub enum GeoConfigError {
    #[error("Failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),

    #[error("Failed to parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),

    #[error("Invalid origin: {0}")]
    Origin(#[from] GeoMeshError),
}
