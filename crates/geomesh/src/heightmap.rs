//! # Heightmap Terrain Meshes
//!
//! Raster elevation grid → sampled, normal-mapped, indexed grid mesh.
//! Works in its own local grid space; no reference origin is involved.
//!
//! Heightmaps are never mutated in place: normalizing, scaling and sampling
//! all return fresh values.
//!
//! ## Table of Contents
//! 1. Heightmap — Row-major elevation grid
//! 2. Normalization and bilinear sampling
//! 3. Normal estimation
//! 4. Grid mesh generation

use bevy::prelude::*;

use crate::error::{GeoMeshError, Result};
use crate::mesh::GeoMesh;

// ============================================================================
// 1. Heightmap — Row-major elevation grid
// ============================================================================

/// Row-major elevation samples; `samples.len() == width * height`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Heightmap {
    width: usize,
    height: usize,
    samples: Vec<f32>,
}

impl Heightmap {
    /// All-zero heightmap
    pub fn flat(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GeoMeshError::invalid(format!(
                "heightmap dimensions must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            samples: vec![0.0; width * height],
        })
    }

    /// Wrap existing samples, failing fast on a length mismatch.
    ///
    /// A zero dimension collapses to the empty 0x0 heightmap.
    pub fn from_samples(width: usize, height: usize, samples: Vec<f32>) -> Result<Self> {
        if samples.len() != width * height {
            return Err(GeoMeshError::invalid(format!(
                "{} samples for a {}x{} heightmap",
                samples.len(),
                width,
                height
            )));
        }
        if samples.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { width, height, samples })
    }

    /// Flatten `grid[row][col]`. Zero rows yields an empty heightmap.
    pub fn from_grid(grid: &[Vec<f32>]) -> Result<Self> {
        let Some(first) = grid.first() else {
            return Ok(Self::default());
        };
        let width = first.len();
        if let Some((row, bad)) = grid.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(GeoMeshError::invalid(format!(
                "ragged grid: row {} has {} columns, expected {}",
                row,
                bad.len(),
                width
            )));
        }
        Self::from_samples(width, grid.len(), grid.concat())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample at a grid cell, clamped to the edges
    pub fn get(&self, col: usize, row: usize) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let col = col.min(self.width - 1);
        let row = row.min(self.height - 1);
        self.samples[row * self.width + col]
    }

    /// Multiply every sample (vertical exaggeration)
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            width: self.width,
            height: self.height,
            samples: self.samples.iter().map(|s| s * factor).collect(),
        }
    }

    // ========================================================================
    // 2. Normalization and bilinear sampling
    // ========================================================================

    /// Rescale every sample into `[0, 1]`.
    ///
    /// Flat terrain (`max == min`) yields an all-zero map.
    pub fn normalize(&self) -> Normalized {
        let (min, max) = self
            .samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        if self.samples.is_empty() {
            return Normalized {
                heightmap: self.clone(),
                min_elevation: 0.0,
                max_elevation: 0.0,
            };
        }

        let range = max - min;
        let samples = if range == 0.0 {
            vec![0.0; self.samples.len()]
        } else {
            self.samples.iter().map(|s| (s - min) / range).collect()
        };

        Normalized {
            heightmap: Self {
                width: self.width,
                height: self.height,
                samples,
            },
            min_elevation: min,
            max_elevation: max,
        }
    }

    /// Bilinear sample at `u, v ∈ [0, 1]`.
    ///
    /// Coordinates map onto `(u * (width - 1), v * (height - 1))`; contributing
    /// cells are clamped, so out-of-range coordinates return edge values.
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }

        let x = grid_coord(u, self.width);
        let y = grid_coord(v, self.height);
        let c0 = x.floor() as usize;
        let r0 = y.floor() as usize;
        let fc = x - c0 as f32;
        let fr = y - r0 as f32;

        let e00 = self.get(c0, r0);
        let e01 = self.get(c0 + 1, r0);
        let e10 = self.get(c0, r0 + 1);
        let e11 = self.get(c0 + 1, r0 + 1);

        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        top * (1.0 - fr) + bot * fr
    }

    // ========================================================================
    // 3. Normal estimation
    // ========================================================================

    /// One unit normal per cell, row-major.
    ///
    /// Central differences with neighbor indices clamped at the borders, so
    /// edge cells get a one-sided difference over the same `2 * cell_size`.
    pub fn generate_normals(&self, cell_size: f32) -> Result<Vec<[f32; 3]>> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GeoMeshError::invalid(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }

        let mut normals = Vec::with_capacity(self.samples.len());
        for row in 0..self.height {
            for col in 0..self.width {
                let left = self.get(col.saturating_sub(1), row);
                let right = self.get(col + 1, row);
                let up = self.get(col, row.saturating_sub(1));
                let down = self.get(col, row + 1);

                let dx = (right - left) / (2.0 * cell_size);
                let dz = (down - up) / (2.0 * cell_size);
                let normal = Vec3::new(-dx, 1.0, -dz).normalize();
                normals.push(normal.to_array());
            }
        }
        Ok(normals)
    }

    // ========================================================================
    // 4. Grid mesh generation
    // ========================================================================

    /// Grid mesh centered on the local origin, with UVs in `[0, 1]`.
    ///
    /// Every quad uses the same diagonal: `(i, i + w, i + 1)` and
    /// `(i + 1, i + w, i + w + 1)`.
    pub fn to_mesh(&self, scale_x: f32, scale_z: f32) -> Result<GeoMesh> {
        if !scale_x.is_finite() || !scale_z.is_finite() {
            return Err(GeoMeshError::invalid(format!(
                "mesh scale must be finite, got {scale_x}x{scale_z}"
            )));
        }

        let (w, h) = (self.width, self.height);
        let offset_x = -((w.saturating_sub(1)) as f32) * scale_x / 2.0;
        let offset_z = -((h.saturating_sub(1)) as f32) * scale_z / 2.0;
        let u_span = w.saturating_sub(1).max(1) as f32;
        let v_span = h.saturating_sub(1).max(1) as f32;

        let mut positions = Vec::with_capacity(w * h);
        let mut uvs = Vec::with_capacity(w * h);
        for row in 0..h {
            for col in 0..w {
                positions.push([
                    offset_x + col as f32 * scale_x,
                    self.samples[row * w + col],
                    offset_z + row as f32 * scale_z,
                ]);
                uvs.push([col as f32 / u_span, row as f32 / v_span]);
            }
        }

        let quads = w.saturating_sub(1) * h.saturating_sub(1);
        let mut indices = Vec::with_capacity(quads * 6);
        let stride = w as u32;
        for row in 0..h.saturating_sub(1) {
            for col in 0..w.saturating_sub(1) {
                let i = (row * w + col) as u32;

                // Two triangles per quad (CCW winding seen from +Y)
                indices.extend([i, i + stride, i + 1]);
                indices.extend([i + 1, i + stride, i + stride + 1]);
            }
        }

        tracing::debug!("Terrain mesh: {}x{} vertices, {} quads", w, h, quads);
        GeoMesh::new(positions, indices)?.with_uvs(uvs)
    }

    /// [`Self::to_mesh`] with [`Self::generate_normals`] attached
    pub fn to_lit_mesh(&self, scale_x: f32, scale_z: f32, cell_size: f32) -> Result<GeoMesh> {
        let normals = self.generate_normals(cell_size)?;
        self.to_mesh(scale_x, scale_z)?.with_normals(normals)
    }
}

/// Map `t ∈ [0, 1]` onto `[0, len - 1]`, clamped; NaN falls back to 0
fn grid_coord(t: f32, len: usize) -> f32 {
    let last = len.saturating_sub(1) as f32;
    let coord = t * last;
    if coord.is_nan() {
        0.0
    } else {
        coord.clamp(0.0, last)
    }
}

/// Output of [`Heightmap::normalize`]
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub heightmap: Heightmap,
    pub min_elevation: f32,
    pub max_elevation: f32,
}
