//! Point cloud sprites drawn as instanced screen-space quads

use bytemuck::{Pod, Zeroable};
use reconview_core::Point3f;

/// Corners emitted per point instance (two triangles)
pub const QUAD_VERTICES: u32 = 6;

/// Per-instance data for one cloud point
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PointInstance {
    pub position: [f32; 3],
}

impl PointInstance {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn from_point(point: &Point3f) -> Self {
        Self {
            position: [point.x, point.y, point.z],
        }
    }

    /// Instance buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<PointInstance>(), 12);
        assert_eq!(PointInstance::desc().step_mode, wgpu::VertexStepMode::Instance);
        let p = PointInstance::from_point(&Point3f::new(1.0, 2.0, 3.0));
        assert_eq!(p.position, [1.0, 2.0, 3.0]);
    }
}
