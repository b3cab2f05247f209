//! Vertex layouts and the small procedural primitives the card scene needs
//! besides the extruded card itself: anchor spheres, band and button
//! cylinders, and the textured markdown plane.

use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeshPrimitive {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl MeshPrimitive {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u16>) -> Self {
        Self { vertices, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = self.vertices.first()?;
        let mut min = Vec3::from(first.position);
        let mut max = min;
        for vertex in &self.vertices[1..] {
            let p = Vec3::from(vertex.position);
            min = min.min(p);
            max = max.max(p);
        }
        Some((min.into(), max.into()))
    }
}

pub fn to_matrix_columns(matrix: Mat4) -> [[f32; 4]; 4] {
    matrix.to_cols_array_2d()
}

/// Unit-diameter UV sphere centred on the origin.
pub fn build_sphere(lat_divisions: u32, lon_divisions: u32) -> MeshPrimitive {
    let lat_steps = lat_divisions.max(3);
    let lon_steps = lon_divisions.max(6);
    let mut vertices = Vec::with_capacity(((lat_steps + 1) * (lon_steps + 1)) as usize);
    let mut indices = Vec::with_capacity((lat_steps * lon_steps * 6) as usize);

    for lat in 0..=lat_steps {
        let theta = lat as f32 / lat_steps as f32 * PI;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for lon in 0..=lon_steps {
            let phi = lon as f32 / lon_steps as f32 * PI * 2.0;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let normal = Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi);
            vertices.push(MeshVertex {
                position: (normal * 0.5).into(),
                normal: normal.normalize_or_zero().into(),
            });
        }
    }

    let ring = (lon_steps + 1) as usize;
    for lat in 0..lat_steps as usize {
        for lon in 0..lon_steps as usize {
            let current = lat * ring + lon;
            let next = current + ring;
            indices.extend_from_slice(&[
                current as u16,
                (current + 1) as u16,
                next as u16,
                (current + 1) as u16,
                (next + 1) as u16,
                next as u16,
            ]);
        }
    }

    MeshPrimitive::new(vertices, indices)
}

/// Unit cylinder along +Y (radius 0.5, height 1) with flat caps.
pub fn build_cylinder(segments: u32) -> MeshPrimitive {
    let ring = segments.max(3);
    let mut vertices = Vec::with_capacity((ring * 4 + 2) as usize);
    let mut indices = Vec::with_capacity((ring * 12) as usize);

    for i in 0..ring {
        let angle = i as f32 / ring as f32 * PI * 2.0;
        let (sin, cos) = angle.sin_cos();
        let normal = [cos, 0.0, sin];
        vertices.push(MeshVertex {
            position: [cos * 0.5, -0.5, sin * 0.5],
            normal,
        });
        vertices.push(MeshVertex {
            position: [cos * 0.5, 0.5, sin * 0.5],
            normal,
        });
    }
    for i in 0..ring {
        let bottom = (i * 2) as u16;
        let top = bottom + 1;
        let next_bottom = (((i + 1) % ring) * 2) as u16;
        let next_top = next_bottom + 1;
        indices.extend_from_slice(&[bottom, top, next_bottom, next_bottom, top, next_top]);
    }

    for (y, normal_y) in [(0.5f32, 1.0f32), (-0.5, -1.0)] {
        let center = vertices.len() as u16;
        vertices.push(MeshVertex {
            position: [0.0, y, 0.0],
            normal: [0.0, normal_y, 0.0],
        });
        for i in 0..ring {
            let angle = i as f32 / ring as f32 * PI * 2.0;
            let (sin, cos) = angle.sin_cos();
            vertices.push(MeshVertex {
                position: [cos * 0.5, y, sin * 0.5],
                normal: [0.0, normal_y, 0.0],
            });
        }
        for i in 0..ring {
            let current = center + 1 + i as u16;
            let next = center + 1 + ((i + 1) % ring) as u16;
            if normal_y > 0.0 {
                indices.extend_from_slice(&[center, next, current]);
            } else {
                indices.extend_from_slice(&[center, current, next]);
            }
        }
    }

    MeshPrimitive::new(vertices, indices)
}

/// Unit quad in the XY plane facing +Z. UV origin is the top-left corner to
/// match raster row order.
pub fn build_plane() -> ([PlaneVertex; 4], [u16; 6]) {
    (
        [
            PlaneVertex {
                position: [-0.5, 0.5, 0.0],
                uv: [0.0, 0.0],
            },
            PlaneVertex {
                position: [0.5, 0.5, 0.0],
                uv: [1.0, 0.0],
            },
            PlaneVertex {
                position: [-0.5, -0.5, 0.0],
                uv: [0.0, 1.0],
            },
            PlaneVertex {
                position: [0.5, -0.5, 0.0],
                uv: [1.0, 1.0],
            },
        ],
        [0, 2, 1, 1, 2, 3],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outward_facing(primitive: &MeshPrimitive) -> bool {
        primitive.indices.chunks_exact(3).all(|tri| {
            let a = Vec3::from(primitive.vertices[tri[0] as usize].position);
            let b = Vec3::from(primitive.vertices[tri[1] as usize].position);
            let c = Vec3::from(primitive.vertices[tri[2] as usize].position);
            let face = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            face.length() < 1e-6 || face.dot(centroid) > -1e-6
        })
    }

    #[test]
    fn cylinder_winds_outward() {
        let cylinder = build_cylinder(8);
        assert_eq!(cylinder.triangle_count(), 8 * 4);
        assert!(outward_facing(&cylinder));
        let (min, max) = cylinder.bounds().expect("vertices present");
        assert!((max[1] - min[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sphere_winds_outward() {
        let sphere = build_sphere(8, 8);
        assert!(outward_facing(&sphere));
    }

    #[test]
    fn plane_faces_positive_z() {
        let (vertices, indices) = build_plane();
        for tri in indices.chunks_exact(3) {
            let a = Vec3::from(vertices[tri[0] as usize].position);
            let b = Vec3::from(vertices[tri[1] as usize].position);
            let c = Vec3::from(vertices[tri[2] as usize].position);
            assert!((b - a).cross(c - a).z > 0.0);
        }
    }
}
