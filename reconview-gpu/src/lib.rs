//! # reconview GPU
//!
//! wgpu rendering for the reconstruction viewer: a shaded or flat surface
//! pass, a wireframe line pass drawn on top of it, and instanced point
//! sprites for the raw input cloud.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use reconview_gpu::{GfxContext, ModelRenderer, RenderConfig};
//!
//! async fn example(window: Arc<winit::window::Window>) -> reconview_core::Result<()> {
//!     let gfx = GfxContext::new(window).await?;
//!     let _renderer = ModelRenderer::new(&gfx.device, gfx.config.format, gfx.size, RenderConfig::default());
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod mesh;
pub mod points;
pub mod renderer;

// Re-export commonly used items
pub use device::{DepthTarget, GfxContext, MsaaTarget};
pub use mesh::{edge_indices, mesh_vertices, triangle_indices, GpuModel, MeshVertex};
pub use points::PointInstance;
pub use renderer::{
    srgb_to_linear, CameraUniform, DrawFlags, MaterialUniform, ModelRenderer, RenderConfig,
};
