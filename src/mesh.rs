use std::f32::consts::{PI, TAU};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// GPU ready mesh buffers.
///
/// Vertices are laid out as `position.xyz` followed by `normal.xyz`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub const STRIDE: usize = 6;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn position(&self, index: usize) -> [f32; 3] {
        let base = index * Self::STRIDE;
        [
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        ]
    }

    pub fn normal(&self, index: usize) -> [f32; 3] {
        let base = index * Self::STRIDE + 3;
        [
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        ]
    }
}

/// Builds a UV sphere centred on the origin.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Result<MeshData> {
    if radius <= 0.0 || !radius.is_finite() {
        return Err(anyhow!("sphere radius must be positive, got {radius}"));
    }
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::with_capacity(
        ((width_segments + 1) * (height_segments + 1)) as usize * MeshData::STRIDE,
    );
    let mut grid = Vec::with_capacity(height_segments as usize + 1);
    let mut next_index = 0u32;

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let mut row = Vec::with_capacity(width_segments as usize + 1);
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let normal = [
                -(u * TAU).cos() * (v * PI).sin(),
                (v * PI).cos(),
                (u * TAU).sin() * (v * PI).sin(),
            ];
            vertices.extend_from_slice(&[
                normal[0] * radius,
                normal[1] * radius,
                normal[2] * radius,
            ]);
            vertices.extend_from_slice(&normal);
            row.push(next_index);
            next_index += 1;
        }
        grid.push(row);
    }

    let mut indices = Vec::new();
    for iy in 0..height_segments as usize {
        for ix in 0..width_segments as usize {
            let a = grid[iy][ix + 1];
            let b = grid[iy][ix];
            let c = grid[iy + 1][ix];
            let d = grid[iy + 1][ix + 1];
            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments as usize - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Ok(MeshData { vertices, indices })
}
