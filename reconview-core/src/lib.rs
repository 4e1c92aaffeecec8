//! Core data structures and traits for reconview
//! 
//! This crate provides the geometry shared by the viewer: points, point
//! clouds, triangle meshes, axis-aligned bounds, and the crate-wide error type.

pub mod point;
pub mod point_cloud;
pub mod mesh;
pub mod traits;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use mesh::*;
pub use traits::*;
pub use error::*;

