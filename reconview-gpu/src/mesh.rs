//! Mesh geometry on the GPU: surface triangles and wireframe edges

use crate::points::PointInstance;
use bytemuck::{Pod, Zeroable};
use reconview_core::{Error, Point3f, PointCloud, Result, TriangleMesh};
use wgpu::util::DeviceExt;

/// Vertex data for surface and wireframe rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Interleave positions with per-vertex normals, falling back to +Z
pub fn mesh_vertices(mesh: &TriangleMesh) -> Vec<MeshVertex> {
    mesh.vertices
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let normal = mesh
                .normals
                .as_ref()
                .and_then(|n| n.get(i))
                .map(|n| [n.x, n.y, n.z])
                .unwrap_or([0.0, 0.0, 1.0]);
            MeshVertex {
                position: [v.x, v.y, v.z],
                normal,
            }
        })
        .collect()
}

fn to_u32(index: usize) -> Result<u32> {
    u32::try_from(index)
        .map_err(|_| Error::Gpu(format!("Vertex index {} exceeds the 32-bit index range", index)))
}

/// Index buffer contents for a triangle list
pub fn triangle_indices(mesh: &TriangleMesh) -> Result<Vec<u32>> {
    let mut indices = Vec::with_capacity(mesh.faces.len() * 3);
    for face in &mesh.faces {
        for &i in face {
            indices.push(to_u32(i)?);
        }
    }
    Ok(indices)
}

/// Index buffer contents for a line list with every edge drawn once
pub fn edge_indices(mesh: &TriangleMesh) -> Result<Vec<u32>> {
    let edges = mesh.unique_edges();
    let mut indices = Vec::with_capacity(edges.len() * 2);
    for [a, b] in edges {
        indices.push(to_u32(a)?);
        indices.push(to_u32(b)?);
    }
    Ok(indices)
}

/// Uploaded buffers for one reconstruction and its optional source cloud
pub struct GpuModel {
    pub vertex_buffer: wgpu::Buffer,
    pub triangle_buffer: wgpu::Buffer,
    pub triangle_count: u32,
    pub edge_buffer: wgpu::Buffer,
    pub edge_count: u32,
    pub point_buffer: Option<wgpu::Buffer>,
    pub point_count: u32,
}

impl GpuModel {
    /// Upload `mesh` and, when present and non-empty, `cloud`
    pub fn upload(
        device: &wgpu::Device,
        mesh: &TriangleMesh,
        cloud: Option<&PointCloud<Point3f>>,
    ) -> Result<Self> {
        if mesh.is_empty() {
            return Err(Error::Gpu("Cannot upload a mesh without faces".to_string()));
        }

        let vertices = mesh_vertices(mesh);
        let triangles = triangle_indices(mesh)?;
        let edges = edge_indices(mesh)?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let triangle_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&triangles),
            usage: wgpu::BufferUsages::INDEX,
        });
        let edge_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Wireframe Index Buffer"),
            contents: bytemuck::cast_slice(&edges),
            usage: wgpu::BufferUsages::INDEX,
        });

        let instances: Vec<PointInstance> = cloud
            .map(|c| c.iter().map(PointInstance::from_point).collect())
            .unwrap_or_default();
        let point_buffer = (!instances.is_empty()).then(|| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Point Instance Buffer"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            })
        });

        log::debug!(
            "Uploaded {} vertices, {} triangles, {} edges, {} points",
            vertices.len(),
            mesh.face_count(),
            edges.len() / 2,
            instances.len()
        );

        Ok(Self {
            vertex_buffer,
            triangle_buffer,
            triangle_count: to_u32(triangles.len())?,
            edge_buffer,
            edge_count: to_u32(edges.len())?,
            point_buffer,
            point_count: to_u32(instances.len())?,
        })
    }
}
