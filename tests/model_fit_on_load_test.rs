#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
use orbit_scene::{
    context::Context,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
    scene::{SceneEvent, SceneState},
};

/// Waits until the model flow reports back, then checks the camera.
#[cfg(feature = "integration-tests")]
struct CameraUntouched {
    expected: cgmath::Point3<f32>,
    zfar: f32,
    frames: std::cell::Cell<u32>,
}

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<SceneState, SceneEvent> for CameraUntouched {
    fn on_init(&mut self, _: &mut Context, _: &mut SceneState) -> Out<SceneState, SceneEvent> {
        Out::Empty
    }

    fn on_update(
        &mut self,
        _: &Context,
        _: &mut SceneState,
        _: instant::Duration,
    ) -> Out<SceneState, SceneEvent> {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut SceneState,
        _: &image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error> {
        use cgmath::MetricSpace;

        self.frames.set(self.frames.get() + 1);
        if state.loaded_models.is_empty() && state.failed_models.is_empty() {
            assert!(self.frames.get() < 300, "the model never finished loading");
            return Ok(ImageTestResult::Waiting);
        }
        assert!(state.failed_models.is_empty(), "{:?}", state.failed_models);
        assert_eq!(state.loaded_models.len(), 1);

        let position = ctx.camera.camera.position;
        assert!(position.distance(self.expected) < 1e-4, "{:?}", position);
        assert_eq!(ctx.projection.zfar, self.zfar);
        Ok(ImageTestResult::Passed)
    }
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_leave_camera_alone_for_model_without_geometry() {
    use crate::common::documents::Document;
    use cgmath::{EuclideanSpace, Point3};
    use orbit_scene::{
        config::SceneConfig,
        flow::FlowConsturctor,
        scene::SceneBuilder,
    };

    let config = SceneConfig::empty().with_fit_camera_on_load(true, 1.25);
    let check = CameraUntouched {
        expected: Point3::from_vec(config.camera_position),
        zfar: config.zfar,
        frames: std::cell::Cell::new(0),
    };
    let draco_only = Document {
        draco: true,
        ..Default::default()
    };

    let mut constructors = SceneBuilder::new(config).gltf(draco_only.to_data_uri()).build();
    let check_constructor: FlowConsturctor<SceneState, SceneEvent> = Box::new(|_| {
        Box::pin(async move { Box::new(check) as Box<dyn GraphicsFlow<_, _>> })
    });
    constructors.push(check_constructor);

    if let Err(e) = orbit_scene::flow::run(constructors) {
        panic!("{}", e);
    }
}
