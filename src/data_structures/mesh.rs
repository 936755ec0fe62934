//! Vertex layout, GPU meshes and the procedural shapes used by the scenes.

use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [u8; 4],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];

    pub fn new(position: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            color: Self::WHITE,
            tex_coords,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Colors are stored as bytes and normalized to 0..1 on fetch.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Unorm8x4,
                },
                wgpu::VertexAttribute {
                    offset: (mem::size_of::<[f32; 3]>() + mem::size_of::<[u8; 4]>())
                        as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// CPU-side geometry: vertices plus a triangle list of indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// A unit square in the XY plane, counter-clockwise from the bottom left.
    pub fn quad(colors: [[u8; 4]; 4], tex_coords: [[f32; 2]; 4]) -> Self {
        let positions = [
            [-0.5, -0.5, 0.0],
            [0.5, -0.5, 0.0],
            [0.5, 0.5, 0.0],
            [-0.5, 0.5, 0.0],
        ];
        let vertices = (0..4)
            .map(|i| Vertex {
                position: positions[i],
                color: colors[i],
                tex_coords: tex_coords[i],
            })
            .collect();
        Self {
            vertices,
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// A unit plane in the XZ plane facing +Y, with texture coordinates
    /// spanning `min..max`.
    pub fn plane(min: [f32; 2], max: [f32; 2]) -> Self {
        let vertices = vec![
            Vertex::new([-0.5, 0.0, 0.5], [min[0], min[1]]),
            Vertex::new([0.5, 0.0, 0.5], [max[0], min[1]]),
            Vertex::new([0.5, 0.0, -0.5], [max[0], max[1]]),
            Vertex::new([-0.5, 0.0, -0.5], [min[0], max[1]]),
        ];
        Self {
            vertices,
            indices: vec![0, 1, 2, 2, 3, 0],
        }
    }

    /// A unit cube centered at the origin. Every face has its own four
    /// vertices so each face maps the full texture.
    pub fn cube() -> Self {
        // (outward normal, right, up) per face
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];
        let corners = [
            ([-1.0, -1.0], [0.0, 0.0]),
            ([1.0, -1.0], [1.0, 0.0]),
            ([1.0, 1.0], [1.0, 1.0]),
            ([-1.0, 1.0], [0.0, 1.0]),
        ];

        let mut geometry = Self::default();
        for (normal, right, up) in faces {
            let base = geometry.vertices.len() as u32;
            for ([sx, sy], uv) in corners {
                let position = [0, 1, 2].map(|axis| {
                    0.5 * (normal[axis] + sx * right[axis] + sy * up[axis])
                });
                geometry.vertices.push(Vertex::new(position, uv));
            }
            geometry
                .indices
                .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        geometry
    }
}

/// Geometry uploaded to the GPU.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Mesh {
    /// Upload `geometry`. The vertex buffer accepts later writes, so scenes
    /// can stream per-frame vertex data through [`Mesh::write_vertices`].
    pub fn new(device: &wgpu::Device, name: &str, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&geometry.vertices),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: geometry.indices.len() as u32,
        }
    }

    pub fn write_vertices(&self, queue: &wgpu::Queue, vertices: &[Vertex]) {
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(vertices));
    }

    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_elements, 0, 0..1);
    }

    pub fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    fn face_normal(geometry: &Geometry, tri: &[u32]) -> Vector3<f32> {
        let p = |i: u32| Vector3::from(geometry.vertices[i as usize].position);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
    }

    #[test]
    fn cube_triangles_wind_counter_clockwise_from_outside() {
        let cube = Geometry::cube();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        for tri in cube.indices.chunks(3) {
            let centroid: Vector3<f32> = tri
                .iter()
                .map(|i| Vector3::from(cube.vertices[*i as usize].position))
                .fold(Vector3::new(0.0, 0.0, 0.0), |a, b| a + b)
                / 3.0;
            assert!(face_normal(&cube, tri).dot(centroid) > 0.0);
        }
    }

    #[test]
    fn plane_faces_up_and_spans_its_uv_range() {
        let plane = Geometry::plane([0.0, 0.0], [20.0, 20.0]);
        let normal = face_normal(&plane, &plane.indices[..3]).normalize();
        assert!((normal.y - 1.0).abs() < 1e-6);
        assert!(plane.vertices.iter().any(|v| v.tex_coords == [20.0, 20.0]));
    }

    #[test]
    fn quad_keeps_per_corner_attributes() {
        let colors = [[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 14, 15, 16]];
        let quad = Geometry::quad(colors, [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        assert_eq!(quad.vertices[2].color, [9, 10, 11, 12]);
        assert_eq!(quad.vertices[3].tex_coords, [0.0, 1.0]);
        assert!(face_normal(&quad, &quad.indices[..3]).z > 0.0);
    }
}
