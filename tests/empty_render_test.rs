#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_clear_colour() {
    use crate::common::test_utils::{FrameCounter, TestRender};
    use orbit_scene::{
        config::SceneConfig, context::InitContext, flow::ImageTestResult, scene::CanvasFlow,
    };
    use wgpu::Color;

    golden_image_test!(|_: InitContext| {
        let config = SceneConfig::empty().with_clear_colour(Color::WHITE);
        TestRender::new(
            CanvasFlow::new(&config, None, false),
            Box::new(|_: &mut orbit_scene::context::Context| ()),
            Box::new(|state: &FrameCounter, texture: &image::RgbaImage| {
                if state.frame() == 0 {
                    return Ok(ImageTestResult::Waiting);
                }
                let white = image::Rgba([255, 255, 255, 255]);
                for pixel in texture.pixels() {
                    assert_eq!(*pixel, white);
                }
                Ok(ImageTestResult::Passed)
            }),
        )
    });
}
