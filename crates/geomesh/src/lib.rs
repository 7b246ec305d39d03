//! # Eustress GeoMesh — Geospatial Data → Renderable Meshes
//!
//! Turns geographic vector and raster data into triangle meshes for a
//! real-time 3D scene while keeping precision across the whole range, from
//! global geodetic coordinates down to sub-meter vertices.
//!
//! ## Architecture
//! ```text
//! vector geometry → ReferenceOrigin (f64 → local f32) → tessellation → GeoMesh
//! raster elevation → Heightmap → sampled grid + normals          → GeoMesh
//! ```
//! Everything is a pure function over immutable inputs, so meshes for
//! independent inputs can be built in parallel without locking.
//!
//! ## Modules
//! - `coords` — Reference origins, equirectangular + Web-Mercator transforms, tile bounds
//! - `vector_render` — Polygon / polyline / tile-quad tessellation
//! - `heightmap` — Elevation grids, sampling, normals, grid meshes
//! - `terrain_import` — SRTM HGT tiles → heightmaps
//! - `mesh` — Shared mesh output type + Bevy interop
//! - `config` — Parse `geo.toml`
//! - `error` — Error taxonomy

pub mod config;
pub mod coords;
pub mod error;
pub mod heightmap;
pub mod mesh;
pub mod terrain_import;
pub mod vector_render;

pub use config::{GeoConfigError, GeoMeshConfig};
pub use coords::{meters_per_degree, Direction, OriginKind, ReferenceOrigin, TileId};
pub use error::{GeoMeshError, Result};
pub use heightmap::{Heightmap, Normalized};
pub use mesh::GeoMesh;
pub use terrain_import::{HgtTile, TerrainImportError};
pub use vector_render::{
    create_tile_quad, line_string_to_positions, line_string_to_ribbon_mesh, tessellate_geometry,
    tessellate_multi_polygon, tessellate_polygon, tile_quad,
};
