//! Orbit camera controls.
//!
//! The camera circles around a target point. Input is accumulated from winit
//! window events and applied once per frame in [`OrbitControls::update`]:
//!
//! - left drag rotates around the target
//! - right drag pans target and camera in the view plane
//! - the mouse wheel dollies towards or away from the target
//!
//! Distance is clamped to `min_distance..=max_distance` and the polar angle
//! is kept away from the poles so the view never flips.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3, Vector2, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::camera::{Camera, Projection};

const EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragState {
    None,
    Rotate,
    Pan,
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub enabled: bool,
    // pending input, consumed by `update`
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
    pan_pixels: Vector2<f32>,
    drag: DragState,
    cursor: Option<PhysicalPosition<f64>>,
    viewport_height: f32,
    // baseline for `reset`
    target0: Point3<f32>,
    position0: Point3<f32>,
}

impl OrbitControls {
    /// Controls orbiting around the camera's current target. The current
    /// camera placement becomes the saved state.
    pub fn new(camera: &Camera) -> Self {
        Self {
            target: camera.target,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            enabled: true,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
            pan_pixels: Vector2::zero(),
            drag: DragState::None,
            cursor: None,
            viewport_height: 1.0,
            target0: camera.target,
            position0: camera.position,
        }
    }

    /// Remember the current target and camera position as the new baseline.
    pub fn save_state(&mut self, camera: &Camera) {
        self.target0 = self.target;
        self.position0 = camera.position;
    }

    /// Return to the last saved state and drop any pending input.
    pub fn reset(&mut self, camera: &mut Camera) {
        self.target = self.target0;
        camera.position = self.position0;
        camera.look_at(self.target);
        self.clear_pending();
    }

    pub fn saved_target(&self) -> Point3<f32> {
        self.target0
    }

    pub fn saved_position(&self) -> Point3<f32> {
        self.position0
    }

    /// Height of the canvas in physical pixels, used to scale drag rotation.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Rotate around the up axis (azimuth), in radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.delta_theta -= angle;
    }

    /// Rotate towards the up axis (polar angle), in radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.delta_phi -= angle;
    }

    /// Move closer by multiplying the distance with `dolly_scale` (< 1).
    pub fn dolly_in(&mut self, dolly_scale: f32) {
        self.scale *= dolly_scale;
    }

    pub fn dolly_out(&mut self, dolly_scale: f32) {
        self.scale /= dolly_scale;
    }

    /// Queue a pan by a screen-space delta in physical pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pan_pixels += Vector2::new(dx, dy);
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn clear_pending(&mut self) {
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.scale = 1.0;
        self.pan_pixels = Vector2::zero();
    }

    /// Feed a window event into the controls. Returns `true` if the event
    /// changed pending input.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        if !self.enabled {
            return false;
        }
        match event {
            WindowEvent::Resized(size) => {
                self.viewport_height = size.height.max(1) as f32;
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => DragState::Rotate,
                    (MouseButton::Right, ElementState::Pressed) => DragState::Pan,
                    (_, ElementState::Released) => DragState::None,
                    _ => self.drag,
                };
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let last = self.cursor.replace(*position);
                let Some(last) = last else {
                    return false;
                };
                let dx = (position.x - last.x) as f32;
                let dy = (position.y - last.y) as f32;
                match self.drag {
                    DragState::Rotate => {
                        let h = self.viewport_height;
                        self.rotate_left(2.0 * PI * dx / h * self.rotate_speed);
                        self.rotate_up(2.0 * PI * dy / h * self.rotate_speed);
                        true
                    }
                    DragState::Pan => {
                        self.pan(dx * self.pan_speed, dy * self.pan_speed);
                        true
                    }
                    DragState::None => false,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = DragState::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                if dy > 0.0 {
                    self.dolly_in(self.zoom_scale());
                } else if dy < 0.0 {
                    self.dolly_out(self.zoom_scale());
                }
                dy != 0.0
            }
            _ => false,
        }
    }

    /// Apply pending rotation, dolly and pan to `camera`. Returns `true` if
    /// the camera moved.
    pub fn update(&mut self, camera: &mut Camera, projection: &Projection, viewport_height: f32) -> bool {
        if !self.enabled {
            self.clear_pending();
            return false;
        }
        let before = camera.position;
        let offset = camera.position - self.target;

        // spherical coordinates with y up
        let mut radius = offset.magnitude();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > EPS {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            PI / 2.0
        };

        theta += self.delta_theta;
        phi += self.delta_phi;
        phi = phi.clamp(self.min_polar_angle.max(EPS), self.max_polar_angle.min(PI - EPS));

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.pan_pixels != Vector2::zero() {
            let target_distance = radius * (projection.fovy.0 / 2.0).tan();
            let height = viewport_height.max(1.0);
            let forward = (-offset).normalize();
            let right = forward.cross(camera.up).normalize();
            let up = right.cross(forward);
            let left = -right * (2.0 * self.pan_pixels.x * target_distance / height);
            let upward = up * (2.0 * self.pan_pixels.y * target_distance / height);
            self.target += left + upward;
        }

        let sin_phi = phi.sin();
        let new_offset = Vector3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = self.target + new_offset;
        camera.look_at(self.target);

        self.clear_pending();
        (camera.position - before).magnitude2() > EPS * EPS
    }
}
