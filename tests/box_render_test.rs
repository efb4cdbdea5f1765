#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_orange_box_in_the_center() {
    use crate::common::test_utils::{FrameCounter, TestRender, center_pixel};
    use orbit_scene::{
        config::SceneConfig,
        context::{Context, InitContext},
        flow::ImageTestResult,
        scene::{BoxesFlow, CanvasFlow},
    };

    golden_image_test!(|init: InitContext| {
        let config = SceneConfig::empty();
        let canvas = CanvasFlow::new(&config, Some(config.ambient_intensity), false);
        TestRender::new(
            BoxesFlow::new(&init.device, &init.queue, &[[0.0, 0.0, 0.0].into()]),
            Box::new(move |ctx: &mut Context| canvas.configure(ctx)),
            Box::new(|state: &FrameCounter, texture: &image::RgbaImage| {
                if state.frame() < 2 {
                    return Ok(ImageTestResult::Waiting);
                }
                let image::Rgba([r, g, b, _]) = center_pixel(texture);
                assert!(r > 100, "box should be lit orange, got {:?}", (r, g, b));
                assert!(g < r && b < 20, "box should be orange, got {:?}", (r, g, b));

                let corner = texture.get_pixel(0, 0);
                assert_eq!(*corner, image::Rgba([0, 0, 0, 255]));
                Ok(ImageTestResult::Passed)
            }),
        )
    });
}
