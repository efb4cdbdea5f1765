//! The stage: camera, projection, ambient light, clear colour and controls.

use cgmath::{Deg, Point3};
use instant::Duration;

use crate::{
    camera::Camera,
    config::SceneConfig,
    context::Context,
    controls::OrbitControls,
    flow::{GraphicsFlow, Out},
    render::Render,
};

#[derive(Clone, Debug)]
pub struct CanvasFlow {
    camera_position: Point3<f32>,
    fovy: Deg<f32>,
    znear: f32,
    zfar: f32,
    clear_colour: wgpu::Color,
    ambient: Option<f32>,
    orbit_controls: bool,
}

impl CanvasFlow {
    /// Without an ambient light the scene is lit with intensity 0.
    pub fn new(config: &SceneConfig, ambient: Option<f32>, orbit_controls: bool) -> Self {
        Self {
            camera_position: Point3::new(
                config.camera_position.x,
                config.camera_position.y,
                config.camera_position.z,
            ),
            fovy: Deg(config.fovy_degrees),
            znear: config.znear,
            zfar: config.zfar,
            clear_colour: config.clear_colour,
            ambient,
            orbit_controls,
        }
    }

    /// Apply the stage to `ctx`. The camera looks at the origin.
    pub fn configure(&self, ctx: &mut Context) {
        let camera = Camera::new(self.camera_position, Point3::new(0.0, 0.0, 0.0));

        ctx.projection.fovy = self.fovy.into();
        ctx.projection.znear = self.znear;
        ctx.projection.zfar = self.zfar;
        ctx.projection.update_projection_matrix();

        let mut controls = OrbitControls::new(&camera);
        controls.enabled = self.orbit_controls;
        controls.set_viewport_height(ctx.config.height);
        ctx.camera.camera = camera;
        ctx.camera.controls = controls;

        let intensity = self.ambient.unwrap_or(0.0);
        ctx.light.set_intensity(&ctx.queue, intensity);
        ctx.clear_colour = self.clear_colour;

        log::info!(
            "Canvas ready: camera at {:?}, fov {:?}, ambient {}, orbit controls {}",
            self.camera_position,
            self.fovy,
            intensity,
            self.orbit_controls
        );
    }
}

impl<S, E> GraphicsFlow<S, E> for CanvasFlow {
    fn on_init(&mut self, ctx: &mut Context, _state: &mut S) -> Out<S, E> {
        self.configure(ctx);
        Out::Empty
    }

    fn on_update(&mut self, _ctx: &Context, _state: &mut S, _dt: Duration) -> Out<S, E> {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }
}
