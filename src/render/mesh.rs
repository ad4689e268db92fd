//! Mesh data and generation
//!
//! Procedural shapes are unit sized: the sphere and capsule have radius one and
//! the cube spans `-1..1` on every axis. Entities scale them to their collider.

use std::f32::consts::PI;
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::{RenderError, RenderResult};
use crate::scene::description::ModelSource;

/// Vertex with position, normal and UV
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle mesh
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub name: String,
}

impl Mesh {
    pub fn new(name: &str) -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Mesh for a scene model. OBJ files that fail to load become a cube.
    pub fn for_model(source: &ModelSource) -> Self {
        match source {
            ModelSource::Sphere => Self::sphere(32, 16),
            ModelSource::Cube => Self::cube(),
            ModelSource::Capsule => Self::capsule(1.0, 1.0, 24, 8),
            ModelSource::Obj(path) => Self::load_obj(path).unwrap_or_else(|err| {
                log::warn!("{err}; drawing a cube instead");
                Self::cube()
            }),
        }
    }

    /// Cube spanning `-1..1`
    pub fn cube() -> Self {
        let mut mesh = Mesh::new("cube");

        let faces = [
            (Vec3::Z, Vec3::X),
            (-Vec3::Z, -Vec3::X),
            (Vec3::X, -Vec3::Z),
            (-Vec3::X, Vec3::Z),
            (Vec3::Y, Vec3::X),
            (-Vec3::Y, Vec3::X),
        ];
        for (normal, right) in faces {
            let up = normal.cross(right);
            let base = mesh.vertices.len() as u32;
            let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
            for (u, v) in corners {
                mesh.vertices.push(Vertex {
                    position: normal + right * u + up * v,
                    normal,
                    uv: Vec2::new((u + 1.0) * 0.5, (1.0 - v) * 0.5),
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// UV sphere of radius one
    pub fn sphere(segments: u32, rings: u32) -> Self {
        let mut mesh = Mesh::new("sphere");
        let segments = segments.max(3);
        let rings = rings.max(2);

        for ring in 0..=rings {
            let phi = ring as f32 * PI / rings as f32;
            for segment in 0..=segments {
                let theta = segment as f32 * 2.0 * PI / segments as f32;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                mesh.vertices.push(Vertex {
                    position: normal,
                    normal,
                    uv: Vec2::new(
                        segment as f32 / segments as f32,
                        ring as f32 / rings as f32,
                    ),
                });
            }
        }
        push_grid_indices(&mut mesh.indices, 0, segments, rings);

        mesh
    }

    /// Capsule along Y: two hemispheres joined by a cylinder
    pub fn capsule(radius: f32, half_height: f32, segments: u32, cap_rings: u32) -> Self {
        let mut mesh = Mesh::new("capsule");
        let segments = segments.max(3);
        let cap_rings = cap_rings.max(1);
        // Top cap, then bottom cap; the grid between them forms the side.
        let rows = 2 * cap_rings + 1;

        for row in 0..=rows {
            let (phi, offset) = if row <= cap_rings {
                (row as f32 * 0.5 * PI / cap_rings as f32, half_height)
            } else {
                let r = row - 1;
                (r as f32 * 0.5 * PI / cap_rings as f32, -half_height)
            };
            for segment in 0..=segments {
                let theta = segment as f32 * 2.0 * PI / segments as f32;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                mesh.vertices.push(Vertex {
                    position: normal * radius + Vec3::Y * offset,
                    normal,
                    uv: Vec2::new(segment as f32 / segments as f32, row as f32 / rows as f32),
                });
            }
        }
        push_grid_indices(&mut mesh.indices, 0, segments, rows);

        mesh
    }

    /// Flat square on the XZ plane
    pub fn plane(size: f32, subdivisions: u32) -> Self {
        let mut mesh = Mesh::new("plane");
        let subdivisions = subdivisions.max(1);
        let step = size / subdivisions as f32;
        let half = size * 0.5;

        for z in 0..=subdivisions {
            for x in 0..=subdivisions {
                mesh.vertices.push(Vertex {
                    position: Vec3::new(-half + x as f32 * step, 0.0, -half + z as f32 * step),
                    normal: Vec3::Y,
                    uv: Vec2::new(x as f32, z as f32) / subdivisions as f32,
                });
            }
        }
        push_grid_indices(&mut mesh.indices, 0, subdivisions, subdivisions);

        mesh
    }

    /// Load every model in an OBJ file into one mesh.
    pub fn load_obj(path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let (models, _materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| {
                RenderError::ObjLoad {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "obj".to_string());
        let mut mesh = Mesh::new(&name);

        for model in &models {
            let data = &model.mesh;
            let base = mesh.vertices.len() as u32;
            let count = data.positions.len() / 3;
            let has_normals = data.normals.len() >= count * 3;
            let has_uvs = data.texcoords.len() >= count * 2;

            for i in 0..count {
                let p = &data.positions[i * 3..i * 3 + 3];
                let normal = if has_normals {
                    let n = &data.normals[i * 3..i * 3 + 3];
                    Vec3::new(n[0], n[1], n[2])
                } else {
                    Vec3::ZERO
                };
                let uv = if has_uvs {
                    Vec2::new(data.texcoords[i * 2], 1.0 - data.texcoords[i * 2 + 1])
                } else {
                    Vec2::ZERO
                };
                mesh.vertices.push(Vertex {
                    position: Vec3::new(p[0], p[1], p[2]),
                    normal,
                    uv,
                });
            }
            let start = mesh.indices.len();
            mesh.indices.extend(data.indices.iter().map(|i| base + i));
            if !has_normals {
                generate_normals(&mut mesh, start);
            }
        }

        log::debug!(
            "Loaded {} ({} models, {} triangles)",
            path.display(),
            models.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}

fn push_grid_indices(indices: &mut Vec<u32>, base: u32, columns: u32, rows: u32) {
    for row in 0..rows {
        for column in 0..columns {
            let current = base + row * (columns + 1) + column;
            let next = current + columns + 1;
            indices.extend_from_slice(&[current, current + 1, next, current + 1, next + 1, next]);
        }
    }
}

/// Smooth normals for the triangles from `first_index` on
fn generate_normals(mesh: &mut Mesh, first_index: usize) {
    for tri in mesh.indices[first_index..].chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let (pa, pb, pc) = (
            mesh.vertices[a].position,
            mesh.vertices[b].position,
            mesh.vertices[c].position,
        );
        let face = (pb - pa).cross(pc - pa);
        for i in [a, b, c] {
            mesh.vertices[i].normal += face;
        }
    }
    for i in &mesh.indices[first_index..] {
        let vertex = &mut mesh.vertices[*i as usize];
        vertex.normal = vertex.normal.normalize_or_zero();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mechanics_mesh_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[rstest]
    #[case::cube(Mesh::cube(), 24, 12)]
    #[case::sphere(Mesh::sphere(8, 4), 9 * 5, 8 * 4 * 2)]
    #[case::plane(Mesh::plane(2.0, 2), 9, 8)]
    fn generated_sizes(#[case] mesh: Mesh, #[case] vertices: usize, #[case] triangles: usize) {
        assert_eq!(mesh.vertices.len(), vertices);
        assert_eq!(mesh.triangle_count(), triangles);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn cube_spans_unit_half_extents() {
        let mesh = Mesh::cube();
        for v in &mesh.vertices {
            assert!((v.position.abs().max_element() - 1.0).abs() < 1e-6);
            assert!(v.position.dot(v.normal) > 0.0, "normal points inward");
        }
    }

    #[test]
    fn sphere_normals_match_positions() {
        for v in &Mesh::sphere(16, 8).vertices {
            assert!((v.position.length() - 1.0).abs() < 1e-5);
            assert!(v.position.abs_diff_eq(v.normal, 1e-6));
        }
    }

    #[test]
    fn capsule_height_covers_caps() {
        let mesh = Mesh::capsule(3.0, 4.0, 12, 4);
        let (min, max) = mesh.vertices.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position.y), hi.max(v.position.y))
        });
        assert!((max - 7.0).abs() < 1e-5);
        assert!((min + 7.0).abs() < 1e-5);
    }

    #[test]
    fn obj_without_normals_gets_generated_ones() {
        let dir = temp_dir("normals");
        let path = dir.join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 0 -1\nf 1 2 3\n").unwrap();

        let mesh = Mesh::load_obj(&path).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        for v in &mesh.vertices {
            assert!(v.normal.abs_diff_eq(Vec3::Y, 1e-5), "{:?}", v.normal);
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_obj_falls_back_to_cube() {
        let mesh = Mesh::for_model(&ModelSource::Obj(PathBuf::from("no/such/model.obj")));
        assert_eq!(mesh.name, "cube");
        assert!(Mesh::load_obj("no/such/model.obj").is_err());
    }
}
