//! # Vector Feature Tessellation
//!
//! Converts geographic/projected vector geometry into scene-local meshes.
//! - Polygon / MultiPolygon → flat triangle mesh (holes respected)
//! - LineString → local positions, or a flat ribbon mesh
//! - Tile bounds → textured quad
//!
//! Polygons are triangulated with an unconstrained Delaunay triangulation of
//! every ring vertex, which covers the convex hull. A candidate triangle is
//! kept only when its centroid lies inside the original polygon, so
//! concavities and holes fall out of the containment test.
//!
//! ## Table of Contents
//! 1. Polygon tessellation
//! 2. Polylines and ribbons
//! 3. Tile quads
//! 4. Geometry dispatch

use bevy::prelude::*;
use geo::{
    Centroid, Contains, Coord, Geometry, LineString, MultiPolygon, Polygon, Triangle,
    TriangulateSpade,
};

use crate::coords::{
    lonlat_to_web_mercator, tile_bounds, web_mercator_to_lonlat, OriginKind, ReferenceOrigin,
    TileId,
};
use crate::error::{ensure_finite, GeoMeshError, Result};
use crate::mesh::GeoMesh;

const UP: [f32; 3] = [0.0, 1.0, 0.0];

// ============================================================================
// 1. Polygon tessellation
// ============================================================================

/// Tessellate a polygon (with holes) into a flat mesh at `elevation`.
///
/// Each surviving triangle gets its own three vertices, emitted in the
/// triangulation's vertex order. Empty rings produce an empty mesh.
pub fn tessellate_polygon(
    polygon: &Polygon<f64>,
    origin: &ReferenceOrigin,
    elevation: f32,
) -> Result<GeoMesh> {
    if polygon.exterior().0.len() < 3 {
        tracing::warn!(
            "Polygon tessellation requires at least 3 exterior vertices, got {}",
            polygon.exterior().0.len()
        );
        return Ok(GeoMesh::empty());
    }

    let candidates = polygon
        .unconstrained_triangulation()
        .map_err(|e| GeoMeshError::invalid(format!("triangulation failed: {e:?}")))?;
    let candidate_count = candidates.len();

    let mut positions = Vec::with_capacity(candidate_count * 3);
    let mut degenerate = 0usize;
    for triangle in candidates {
        if is_degenerate(&triangle) {
            degenerate += 1;
            continue;
        }
        if !polygon.contains(&triangle.centroid()) {
            continue;
        }
        for coord in triangle.to_array() {
            positions.push(origin.to_local(coord.x, coord.y, elevation).to_array());
        }
    }

    if degenerate > 0 {
        tracing::warn!("Discarded {} degenerate triangulation candidates", degenerate);
    }
    tracing::debug!(
        "Tessellated polygon: kept {} of {} candidate triangles",
        positions.len() / 3,
        candidate_count
    );

    flat_mesh(positions)
}

/// Tessellate every polygon and concatenate the results
pub fn tessellate_multi_polygon(
    multi_polygon: &MultiPolygon<f64>,
    origin: &ReferenceOrigin,
    elevation: f32,
) -> Result<GeoMesh> {
    multi_polygon.iter().try_fold(GeoMesh::empty(), |merged, polygon| {
        Ok(merged.append(tessellate_polygon(polygon, origin, elevation)?))
    })
}

/// Fewer than three distinct vertices
fn is_degenerate(triangle: &Triangle<f64>) -> bool {
    let [a, b, c] = triangle.to_array();
    a == b || b == c || a == c
}

/// Wrap per-triangle positions with up normals and bounding-box UVs
fn flat_mesh(positions: Vec<[f32; 3]>) -> Result<GeoMesh> {
    if positions.is_empty() {
        return Ok(GeoMesh::empty());
    }

    let (min_x, max_x, min_z, max_z) = positions.iter().fold(
        (f32::MAX, f32::MIN, f32::MAX, f32::MIN),
        |(min_x, max_x, min_z, max_z), p| {
            (min_x.min(p[0]), max_x.max(p[0]), min_z.min(p[2]), max_z.max(p[2]))
        },
    );
    let range_x = (max_x - min_x).max(0.001);
    let range_z = (max_z - min_z).max(0.001);
    let uvs = positions
        .iter()
        .map(|p| [(p[0] - min_x) / range_x, (p[2] - min_z) / range_z])
        .collect();

    let normals = vec![UP; positions.len()];
    let indices = (0..positions.len() as u32).collect();
    GeoMesh::new(positions, indices)?.with_normals(normals)?.with_uvs(uvs)
}

// ============================================================================
// 2. Polylines and ribbons
// ============================================================================

/// Project each vertex of a polyline to local space, in order
pub fn line_string_to_positions(
    line: &LineString<f64>,
    origin: &ReferenceOrigin,
    elevation: f32,
) -> Vec<Vec3> {
    line.coords()
        .map(|c| origin.to_local(c.x, c.y, elevation))
        .collect()
}

/// Generate a flat ribbon mesh along a polyline.
///
/// Every segment is an independent quad of `width` (4 vertices, 2 triangles)
/// lying in the XZ plane and facing up. Interior joints are not mitered, so
/// sharp turns show small gaps or overlaps.
pub fn line_string_to_ribbon_mesh(
    line: &LineString<f64>,
    origin: &ReferenceOrigin,
    width: f32,
    elevation: f32,
) -> Result<GeoMesh> {
    if !width.is_finite() || width < 0.0 {
        return Err(GeoMeshError::invalid(format!(
            "ribbon width must be finite and >= 0, got {width}"
        )));
    }

    let path = line_string_to_positions(line, origin, elevation);
    if path.len() < 2 {
        tracing::warn!("Ribbon mesh requires at least 2 path vertices, got {}", path.len());
        return Ok(GeoMesh::empty());
    }

    let half_w = width * 0.5;
    let segments = path.len() - 1;
    let mut positions = Vec::with_capacity(segments * 4);
    let mut uvs = Vec::with_capacity(segments * 4);
    let mut indices = Vec::with_capacity(segments * 6);

    for pair in path.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let tangent = (end - start).normalize_or_zero();
        if tangent == Vec3::ZERO {
            tracing::warn!("Skipping zero-length ribbon segment at {:?}", start);
            continue;
        }

        // Perpendicular in XZ plane (ribbon lies flat)
        let right = Vec3::new(-tangent.z, 0.0, tangent.x).normalize_or_zero() * half_w;

        let base = positions.len() as u32;
        positions.push((start - right).to_array());
        positions.push((start + right).to_array());
        positions.push((end - right).to_array());
        positions.push((end + right).to_array());
        uvs.extend([[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);

        let (bl, br, tl, tr) = (base, base + 1, base + 2, base + 3);
        indices.extend([bl, br, tl, br, tr, tl]);
    }

    if positions.is_empty() {
        return Ok(GeoMesh::empty());
    }

    tracing::debug!("Ribbon mesh: {} segments, {} vertices", positions.len() / 4, positions.len());
    let normals = vec![UP; positions.len()];
    GeoMesh::new(positions, indices)?.with_normals(normals)?.with_uvs(uvs)
}

// ============================================================================
// 3. Tile quads
// ============================================================================

/// A flat quad over local bounds, with image-space UVs.
///
/// Vertex order is SW, SE, NE, NW (north is -Z, so south is `max_z`); UV
/// (0, 0) is the top-left (north-west) corner of the image.
pub fn create_tile_quad(
    min_x: f32,
    min_z: f32,
    max_x: f32,
    max_z: f32,
    elevation: f32,
) -> Result<GeoMesh> {
    ensure_finite(
        "tile quad bounds",
        &[min_x as f64, min_z as f64, max_x as f64, max_z as f64, elevation as f64],
    )?;
    if min_x > max_x || min_z > max_z {
        return Err(GeoMeshError::invalid(format!(
            "tile quad bounds inverted: x {min_x}..{max_x}, z {min_z}..{max_z}"
        )));
    }

    let positions = vec![
        [min_x, elevation, max_z],
        [max_x, elevation, max_z],
        [max_x, elevation, min_z],
        [min_x, elevation, min_z],
    ];
    let uvs = vec![[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    GeoMesh::new(positions, vec![0, 1, 2, 0, 2, 3])?
        .with_normals(vec![UP; 4])?
        .with_uvs(uvs)
}

/// Place an XYZ map tile in local space and build its quad.
///
/// Projected origins are taken to be Web-Mercator meters; geographic
/// origins receive the tile corners as lon/lat.
pub fn tile_quad(tile: TileId, origin: &ReferenceOrigin, elevation: f32) -> Result<GeoMesh> {
    let bounds = tile_bounds(tile)?;
    let place = |x: f64, y: f64| match origin.kind() {
        OriginKind::Projected => origin.to_local(x, y, elevation),
        OriginKind::Geographic => {
            let (lon, lat) = web_mercator_to_lonlat(x, y);
            origin.to_local(lon, lat, elevation)
        }
    };

    let north_west = place(bounds.min_x, bounds.max_y);
    let south_east = place(bounds.max_x, bounds.min_y);
    create_tile_quad(north_west.x, north_west.z, south_east.x, south_east.z, elevation)
}

/// Projected origin in Web-Mercator meters for a lon/lat anchor
pub fn web_mercator_origin(lon: f64, lat: f64) -> Result<ReferenceOrigin> {
    let (x, y) = lonlat_to_web_mercator(lon, lat);
    ReferenceOrigin::projected(x, y)
}

// ============================================================================
// 4. Geometry dispatch
// ============================================================================

/// Variant name of a geometry, for error reporting
pub fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Tessellate a `Polygon` or `MultiPolygon`; other kinds are rejected
pub fn tessellate_geometry(
    geometry: &Geometry<f64>,
    origin: &ReferenceOrigin,
    elevation: f32,
) -> Result<GeoMesh> {
    match geometry {
        Geometry::Polygon(polygon) => tessellate_polygon(polygon, origin, elevation),
        Geometry::MultiPolygon(multi) => tessellate_multi_polygon(multi, origin, elevation),
        other => Err(GeoMeshError::InvalidGeometryKind {
            expected: "Polygon",
            found: geometry_kind(other),
        }),
    }
}

/// Ribbon mesh for a `LineString` or `MultiLineString`; other kinds are rejected
pub fn line_geometry_to_ribbon_mesh(
    geometry: &Geometry<f64>,
    origin: &ReferenceOrigin,
    width: f32,
    elevation: f32,
) -> Result<GeoMesh> {
    match geometry {
        Geometry::LineString(line) => line_string_to_ribbon_mesh(line, origin, width, elevation),
        Geometry::MultiLineString(lines) => lines.iter().try_fold(GeoMesh::empty(), |merged, line| {
            Ok(merged.append(line_string_to_ribbon_mesh(line, origin, width, elevation)?))
        }),
        other => Err(GeoMeshError::InvalidGeometryKind {
            expected: "LineString",
            found: geometry_kind(other),
        }),
    }
}

/// Ring helper for callers assembling polygons from raw pairs
pub fn ring(coords: &[(f64, f64)]) -> LineString<f64> {
    coords.iter().map(|&(x, y)| Coord { x, y }).collect()
}
