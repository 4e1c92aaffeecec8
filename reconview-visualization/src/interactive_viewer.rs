//! Interactive viewer window
//!
//! Ties the GPU renderer, orbit camera, scene graph, background loader and
//! egui panels together and runs the winit event loop.

use crate::camera::{CameraController, OrbitCamera};
use crate::catalog::{self, Catalog};
use crate::config::ViewerConfig;
use crate::loader::{LoadOutcome, LoadedModel, Loader};
use crate::scene::{ModelId, NodeKind, Scene};
use crate::ui::{UiEvents, UiState};
use anyhow::Result;
use reconview_gpu::{CameraUniform, DrawFlags, GfxContext, GpuModel, ModelRenderer};
use std::collections::HashMap;
use std::sync::Arc;
use winit::{
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

pub struct InteractiveViewer {
    window: Arc<Window>,
    gfx: GfxContext,
    renderer: ModelRenderer,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    camera: OrbitCamera,
    controller: CameraController,
    scene: Scene,
    gpu_models: HashMap<ModelId, GpuModel>,
    ui: UiState,
    loader: Loader,
    catalog: Catalog,
    frame_on_load: bool,
}

impl InteractiveViewer {
    /// Create the viewer and request the configured initial reconstruction
    pub async fn new(window: Arc<Window>, config: ViewerConfig) -> Result<Self> {
        let gfx = GfxContext::new(window.clone()).await?;
        let renderer = ModelRenderer::new(&gfx.device, gfx.config.format, gfx.size, config.render_config());

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        let camera = OrbitCamera::from_config(&config.camera, gfx.aspect_ratio());
        let loader = Loader::spawn()?;
        let catalog = Catalog::new(&config.assets_dir);
        log::info!("Reading reconstructions from {}", catalog.assets_dir().display());

        let mut viewer = Self {
            window,
            gfx,
            renderer,
            egui_ctx,
            egui_state,
            egui_renderer,
            camera,
            controller: CameraController::new(),
            scene: Scene::new(config.show_wireframe, config.show_point_cloud),
            gpu_models: HashMap::new(),
            ui: UiState::new(
                config.initial_selection.clone(),
                config.show_wireframe,
                config.show_point_cloud,
            ),
            loader,
            catalog,
            frame_on_load: config.frame_on_load,
        };
        viewer.select(&config.initial_selection);
        Ok(viewer)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Replace the displayed reconstruction with `key`.
    ///
    /// The old model is removed at once; the new one appears when its load
    /// finishes. Failures end up in the status line.
    pub fn select(&mut self, key: &str) {
        self.scene.clear_models();
        self.gpu_models.clear();
        self.ui.begin_load(key);

        let Some(request) = self.catalog.request(key) else {
            let error = format!("Unknown reconstruction '{}'", key);
            log::error!("{}", error);
            self.ui.fail_load(error);
            return;
        };

        if let Err(e) = self.loader.request(request) {
            log::error!("Failed to queue load of '{}': {}", key, e);
            self.ui.fail_load(e.to_string());
        }
    }

    /// Apply finished loads; only the most recent selection is accepted
    fn poll_loader(&mut self) {
        while let Some(outcome) = self.loader.poll() {
            if !self.ui.accepts(outcome.key()) {
                log::debug!("Discarding stale load of '{}'", outcome.key());
                continue;
            }
            match outcome {
                LoadOutcome::Loaded(model) => self.install(*model),
                LoadOutcome::Failed { key, error } => {
                    log::error!("Failed to load '{}': {}", key, error);
                    self.ui.fail_load(error);
                }
            }
        }
    }

    fn install(&mut self, model: LoadedModel) {
        let LoadedModel {
            key,
            mesh,
            cloud,
            metrics,
            ..
        } = model;

        let gpu_model = match GpuModel::upload(&self.gfx.device, &mesh, cloud.as_ref()) {
            Ok(gpu_model) => gpu_model,
            Err(e) => {
                log::error!("Failed to upload '{}': {}", key, e);
                self.ui.fail_load(e.to_string());
                return;
            }
        };

        let label = catalog::find(&key).map(|(_, o)| o.label).unwrap_or(key.as_str());
        self.scene.clear_models();
        self.gpu_models.clear();
        let id = self.scene.add_model(label, mesh, cloud);
        self.gpu_models.insert(id, gpu_model);

        if self.frame_on_load {
            self.camera.frame_bounds(&self.scene.bounds());
        }
        if let Some(report) = &metrics {
            log::info!(
                "{}: mean error {:?}, Hausdorff {:?}, {} holes",
                key,
                report.mean_error,
                report.hausdorff,
                report.holes
            );
        }
        self.ui.finish_load(metrics);
    }

    fn apply_ui_events(&mut self, events: UiEvents) {
        if let Some(key) = events.selection {
            self.select(&key);
        }
        if let Some(visible) = events.show_wireframe {
            self.scene.set_kind_visible(NodeKind::Wireframe, visible);
        }
        if let Some(visible) = events.show_point_cloud {
            self.scene.set_kind_visible(NodeKind::PointCloud, visible);
            if visible && !self.scene.is_empty() && self.scene.models().iter().all(|m| m.cloud.is_none()) {
                log::info!("No source point cloud available for '{}'", self.ui.selected);
            }
        }
        if events.reset_camera {
            self.camera.reset();
        }
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.renderer.resize(&self.gfx.device, new_size);
            self.camera.set_aspect(new_size.width, new_size.height);
        }
    }

    /// Reconfigure the swap chain after it was lost or became outdated
    pub fn recover_surface(&mut self) {
        let size = self.window.inner_size();
        if size != self.gfx.size {
            self.resize(size);
        } else {
            self.gfx.reconfigure();
        }
    }

    /// Returns true when the event was consumed and needs no further handling
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(&self.window, event);
        if response.consumed {
            if matches!(event, WindowEvent::MouseInput { state: ElementState::Released, .. }) {
                self.controller.cancel_drag();
            }
            return true;
        }

        match event {
            WindowEvent::Resized(size) => self.resize(*size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::KeyR => self.camera.reset(),
                KeyCode::KeyW => {
                    let events = self.ui.toggle_wireframe();
                    self.apply_ui_events(events);
                }
                KeyCode::KeyP => {
                    let events = self.ui.toggle_point_cloud();
                    self.apply_ui_events(events);
                }
                _ => {}
            },
            _ => {
                self.controller.handle_event(event, &mut self.camera, self.gfx.size);
            }
        }
        false
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.poll_loader();

        let frame = self.gfx.surface.get_current_texture()?;
        let swap_view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let viewport = [self.gfx.config.width as f32, self.gfx.config.height as f32];
        let uniform = CameraUniform::new(self.camera.view_proj(), self.camera.eye(), viewport);
        self.renderer.update_camera(&self.gfx.queue, &uniform);

        let draws: Vec<(&GpuModel, DrawFlags)> = self
            .scene
            .models()
            .iter()
            .filter_map(|model| {
                let flags = model.draw_flags();
                self.gpu_models
                    .get(&model.id)
                    .filter(|_| flags.any())
                    .map(|gpu_model| (gpu_model, flags))
            })
            .collect();

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.renderer.render(&mut encoder, &swap_view, &draws);

        let egui_input = self.egui_state.take_egui_input(&self.window);
        self.egui_ctx.begin_frame(egui_input);
        let events = self.ui.show(&self.egui_ctx);
        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(&self.window, egui_output.platform_output);

        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gfx.config.width, self.gfx.config.height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        for (id, delta) in &egui_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }
        let ui_commands = self.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.gfx.queue.submit(
            ui_commands
                .into_iter()
                .chain(std::iter::once(encoder.finish())),
        );
        frame.present();

        if !events.is_empty() {
            self.apply_ui_events(events);
        }
        Ok(())
    }
}

/// Open a window and run the viewer until it is closed
pub fn run(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let [width, height] = config.window_size;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("reconview")
            .with_inner_size(LogicalSize::new(width, height))
            .build(&event_loop)?,
    );

    let mut viewer = pollster::block_on(InteractiveViewer::new(window.clone(), config))?;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                if !viewer.handle_event(&event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed
                                && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                            {
                                elwt.exit();
                            }
                        }
                        WindowEvent::RedrawRequested => match viewer.render() {
                            Ok(()) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                viewer.recover_surface();
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("GPU out of memory, exiting");
                                elwt.exit();
                            }
                            Err(e) => log::warn!("Render error: {:?}", e),
                        },
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                viewer.window().request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
