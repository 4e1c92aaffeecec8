//! Visualization for reconview
//!
//! This crate provides the interactive comparison viewer:
//! - A catalog of sphere and bunny reconstructions
//! - A scene graph with wireframe and point cloud overlays
//! - An arcball orbit camera
//! - Background loading with metrics
//! - egui selectors, toggles and a metrics panel

pub mod camera;
pub mod catalog;
pub mod config;
pub mod interactive_viewer;
pub mod loader;
pub mod scene;
pub mod ui;

pub use camera::{CameraController, OrbitCamera};
pub use catalog::{Catalog, MeshOption, SampleGroup, BUNNY_OPTIONS, SPHERE_OPTIONS};
pub use config::{CameraConfig, ViewerConfig};
pub use interactive_viewer::{run, InteractiveViewer};
pub use loader::{load_model, LoadOutcome, LoadRequest, LoadedModel, Loader};
pub use scene::{Model, ModelId, NodeKind, Scene, SceneNode};
pub use ui::{UiEvents, UiState};
