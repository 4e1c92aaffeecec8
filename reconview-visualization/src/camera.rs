//! Orbit camera with arcball rotation and wheel zoom

use crate::config::CameraConfig;
use nalgebra::{Matrix4, Perspective3, UnitQuaternion};
use reconview_core::{Bounds, Point3f, Vector3f};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Converts OpenGL clip space (Z in [-1, 1]) to wgpu clip space (Z in [0, 1])
#[rustfmt::skip]
pub fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Scale applied to the distance per wheel notch
const ZOOM_STEP: f32 = 1.1;
/// Margin left around framed bounds
const FRAME_MARGIN: f32 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    target: Point3f,
    distance: f32,
    orientation: UnitQuaternion<f32>,
}

/// A perspective camera orbiting a target point.
///
/// `orientation` maps camera space to world space; the camera looks down its
/// local -Z axis, so the eye sits at `target + orientation * (0, 0, distance)`.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Point3f,
    pub distance: f32,
    pub orientation: UnitQuaternion<f32>,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    home: Pose,
}

impl OrbitCamera {
    pub fn new(position: Point3f, target: Point3f, fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let offset = position - target;
        let distance = offset.norm();
        let (distance, orientation) = if distance > f32::EPSILON {
            (distance, look_from(&(offset / distance)))
        } else {
            (1.0, UnitQuaternion::identity())
        };

        let home = Pose {
            target,
            distance,
            orientation,
        };
        let mut camera = Self {
            target,
            distance,
            orientation,
            fov_y,
            aspect,
            near,
            far,
            home,
        };
        camera.distance = camera.clamp_distance(distance);
        camera.home.distance = camera.distance;
        camera
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let [px, py, pz] = config.position;
        let [tx, ty, tz] = config.target;
        Self::new(
            Point3f::new(px, py, pz),
            Point3f::new(tx, ty, tz),
            config.fov_deg.to_radians(),
            aspect,
            config.near,
            config.far,
        )
    }

    pub fn eye(&self) -> Point3f {
        self.target + self.orientation * Vector3f::new(0.0, 0.0, self.distance)
    }

    pub fn up(&self) -> Vector3f {
        self.orientation * Vector3f::y()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye(), &self.target, &self.up())
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let perspective = Perspective3::new(self.aspect, self.fov_y, self.near, self.far);
        opengl_to_wgpu_matrix() * perspective.to_homogeneous()
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn min_distance(&self) -> f32 {
        self.near * 2.0
    }

    pub fn max_distance(&self) -> f32 {
        self.far * 0.5
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance(), self.max_distance())
    }

    /// Dolly towards the target for positive `notches`, away for negative
    pub fn zoom(&mut self, notches: f32) {
        self.distance = self.clamp_distance(self.distance * ZOOM_STEP.powf(-notches));
    }

    /// Rotate as if dragging a virtual trackball from `from` to `to` (pixels)
    pub fn arcball_rotate(&mut self, from: (f64, f64), to: (f64, f64), viewport: (f32, f32)) {
        let v0 = arcball_vector(from, viewport);
        let v1 = arcball_vector(to, viewport);
        // The scene turns from v0 to v1, so the camera turns the other way
        if let Some(rotation) = UnitQuaternion::rotation_between(&v1, &v0) {
            self.orientation = UnitQuaternion::new_normalize(
                (self.orientation * rotation).into_inner(),
            );
        }
    }

    /// Aim at the centre of `bounds` from a distance that fits it in view.
    /// The framed pose becomes the new reset pose.
    pub fn frame_bounds(&mut self, bounds: &Bounds) {
        if !bounds.is_valid() {
            return;
        }
        let radius = (bounds.diagonal() * 0.5).max(1e-3);
        let half_vertical = self.fov_y * 0.5;
        let half_horizontal = ((self.fov_y * 0.5).tan() * self.aspect).atan();
        let half = half_vertical.min(half_horizontal);

        self.target = bounds.center();
        self.distance = self.clamp_distance(radius / half.sin() * FRAME_MARGIN);
        self.home = Pose {
            target: self.target,
            distance: self.distance,
            orientation: self.orientation,
        };
    }

    /// Return to the initial or most recently framed pose
    pub fn reset(&mut self) {
        self.target = self.home.target;
        self.distance = self.home.distance;
        self.orientation = self.home.orientation;
    }
}

/// Orientation whose +Z axis points along `back`, keeping world +Y up where possible
fn look_from(back: &Vector3f) -> UnitQuaternion<f32> {
    let up = Vector3f::y();
    if back.cross(&up).norm() > 1e-4 {
        UnitQuaternion::face_towards(back, &up)
    } else {
        UnitQuaternion::rotation_between(&Vector3f::z(), back)
            .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3f::x_axis(), std::f32::consts::PI))
    }
}

/// Project a cursor position onto the unit trackball sphere in camera space
fn arcball_vector(cursor: (f64, f64), viewport: (f32, f32)) -> Vector3f {
    let (w, h) = viewport;
    let scale = w.min(h).max(1.0);
    let x = (2.0 * cursor.0 as f32 - w) / scale;
    let y = (h - 2.0 * cursor.1 as f32) / scale;
    let d2 = x * x + y * y;
    if d2 <= 1.0 {
        Vector3f::new(x, y, (1.0 - d2).sqrt())
    } else {
        Vector3f::new(x, y, 0.0) / d2.sqrt()
    }
}

/// Turns winit mouse input into camera motion
#[derive(Debug, Default)]
pub struct CameraController {
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the event moved the camera
    pub fn handle_event(
        &mut self,
        event: &WindowEvent,
        camera: &mut OrbitCamera,
        viewport: PhysicalSize<u32>,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                if *button == MouseButton::Left {
                    self.dragging = *state == ElementState::Pressed;
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = (position.x, position.y);
                let moved = match self.last_cursor {
                    Some(last) if self.dragging && last != cursor => {
                        camera.arcball_rotate(
                            last,
                            cursor,
                            (viewport.width as f32, viewport.height as f32),
                        );
                        true
                    }
                    _ => false,
                };
                self.last_cursor = Some(cursor);
                moved
            }
            WindowEvent::CursorLeft { .. } => {
                self.last_cursor = None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                camera.zoom(notches);
                true
            }
            _ => false,
        }
    }

    /// Forget any drag in progress, e.g. when the UI captured the release
    pub fn cancel_drag(&mut self) {
        self.dragging = false;
    }
}
