//! Hover, click and spin state of an interactive box.
//!
//! Color and scale are pure functions of the two flags; rotation is the only
//! value that changes on its own, once per frame in [`BoxState::tick`].

use std::f32::consts::TAU;

use cgmath::{Quaternion, Rad, Rotation3, Vector3};
use instant::Duration;

use crate::{
    data_structures::instance::Instance,
    events::{PointerEvent, PointerEventKind},
};

/// CSS `orange`.
pub const ORANGE: [u8; 3] = [255, 165, 0];
/// CSS `hotpink`.
pub const HOTPINK: [u8; 3] = [255, 105, 180];

pub const SELECTED_SCALE: f32 = 1.5;

/// Convert an 8-bit sRGB color to linear RGBA for the shader.
pub fn srgb_to_linear(rgb: [u8; 3]) -> [f32; 4] {
    let channel = |c: u8| {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), 1.0]
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoxState {
    hovered: bool,
    clicked: bool,
    rotation_x: f32,
}

impl BoxState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> bool {
        self.hovered
    }

    pub fn clicked(&self) -> bool {
        self.clicked
    }

    /// Rotation about the x axis in radians, within `0..TAU`.
    pub fn rotation(&self) -> Rad<f32> {
        Rad(self.rotation_x)
    }

    pub fn hover(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn click(&mut self) {
        self.clicked = !self.clicked;
    }

    /// React to a pointer event. `Over` is consumed here so that ancestors
    /// do not consider themselves hovered as well.
    pub fn on_pointer(&mut self, event: &mut PointerEvent) {
        match event.kind {
            PointerEventKind::Over => {
                event.stop_propagation();
                self.hover(true);
            }
            PointerEventKind::Out => self.hover(false),
            PointerEventKind::Click => self.click(),
            PointerEventKind::Down | PointerEventKind::Up => (),
        }
    }

    /// Advance the rotation by the time elapsed since the previous frame.
    pub fn tick(&mut self, dt: Duration) {
        self.rotation_x = (self.rotation_x + dt.as_secs_f32()).rem_euclid(TAU);
    }

    /// Linear RGBA base color.
    pub fn color(&self) -> [f32; 4] {
        if self.hovered {
            srgb_to_linear(HOTPINK)
        } else {
            srgb_to_linear(ORANGE)
        }
    }

    pub fn scale(&self) -> f32 {
        if self.clicked { SELECTED_SCALE } else { 1.0 }
    }

    /// Local transform of a box placed at `position`.
    pub fn transform(&self, position: Vector3<f32>) -> Instance {
        let scale = self.scale();
        Instance {
            position,
            rotation: Quaternion::from_angle_x(self.rotation()),
            scale: Vector3::new(scale, scale, scale),
        }
    }
}
