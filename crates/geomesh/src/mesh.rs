//! # Mesh Output Contract
//!
//! The one value type shared by the tessellator and the terrain builder:
//! flat positions plus flat triangle indices, with optional per-vertex
//! UVs and normals. Consumers hand it to a renderer's buffer upload path,
//! or convert it into a Bevy [`Mesh`].
//!
//! ## Table of Contents
//! 1. GeoMesh — Validated triangle mesh
//! 2. Bevy interop

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;

use crate::error::{GeoMeshError, Result};

// ============================================================================
// 1. GeoMesh — Validated triangle mesh
// ============================================================================

/// Triangle list mesh.
///
/// Invariants, checked on construction: `indices.len() % 3 == 0`, every
/// index addresses a position, and UV/normal lists (when present) are
/// parallel to the positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoMesh {
    positions: Vec<[f32; 3]>,
    indices: Vec<u32>,
    uvs: Option<Vec<[f32; 2]>>,
    normals: Option<Vec<[f32; 3]>>,
}

impl GeoMesh {
    /// Build a mesh from positions and triangle indices
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(GeoMeshError::invalid(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(GeoMeshError::invalid(format!(
                "index {} out of range for {} positions",
                bad,
                positions.len()
            )));
        }
        Ok(Self {
            positions,
            indices,
            uvs: None,
            normals: None,
        })
    }

    /// An empty mesh (no vertices, no triangles)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach per-vertex UVs
    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Result<Self> {
        self.check_parallel("uv", uvs.len())?;
        self.uvs = Some(uvs);
        Ok(self)
    }

    /// Attach per-vertex normals
    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Result<Self> {
        self.check_parallel("normal", normals.len())?;
        self.normals = Some(normals);
        Ok(self)
    }

    fn check_parallel(&self, what: &str, len: usize) -> Result<()> {
        if len == self.positions.len() {
            Ok(())
        } else {
            Err(GeoMeshError::invalid(format!(
                "{} {what}s for {} positions",
                len,
                self.positions.len()
            )))
        }
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn uvs(&self) -> Option<&[[f32; 2]]> {
        self.uvs.as_deref()
    }

    pub fn normals(&self) -> Option<&[[f32; 3]]> {
        self.normals.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                Vec3::from(self.positions[tri[0] as usize]),
                Vec3::from(self.positions[tri[1] as usize]),
                Vec3::from(self.positions[tri[2] as usize]),
            ]
        })
    }

    /// Concatenate `other` after `self`, rebasing its indices by the current
    /// vertex count.
    ///
    /// An optional attribute survives only if both sides carry it, except
    /// that an empty side never strips the other's attributes.
    pub fn append(mut self, other: GeoMesh) -> GeoMesh {
        if other.positions.is_empty() {
            return self;
        }
        if self.positions.is_empty() {
            return other;
        }

        let offset = self.positions.len() as u32;
        self.indices.extend(other.indices.iter().map(|i| i + offset));
        self.positions.extend(other.positions);
        self.uvs = match (self.uvs, other.uvs) {
            (Some(mut a), Some(b)) => {
                a.extend(b);
                Some(a)
            }
            _ => None,
        };
        self.normals = match (self.normals, other.normals) {
            (Some(mut a), Some(b)) => {
                a.extend(b);
                Some(a)
            }
            _ => None,
        };
        self
    }
}

// ============================================================================
// 2. Bevy interop
// ============================================================================

impl From<GeoMesh> for Mesh {
    fn from(geo_mesh: GeoMesh) -> Self {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, geo_mesh.positions);
        if let Some(normals) = geo_mesh.normals {
            mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        }
        if let Some(uvs) = geo_mesh.uvs {
            mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        }
        mesh.insert_indices(Indices::U32(geo_mesh.indices));
        mesh
    }
}
