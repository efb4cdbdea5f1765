#![allow(dead_code)]

use orbit_scene::{
    context::Context,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};

#[derive(Debug, Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

pub(crate) type Setup = Box<dyn Fn(&mut Context)>;
pub(crate) type Validate =
    Box<dyn Fn(&FrameCounter, &image::RgbaImage) -> Result<ImageTestResult, anyhow::Error>>;

/// Wraps a flow under test: `setup` runs after its `on_init`, `validate`
/// inspects every rendered frame.
pub(crate) struct TestRender {
    inner: Box<dyn GraphicsFlow<FrameCounter, ()>>,
    setup: Setup,
    validate: Validate,
}

impl TestRender {
    pub(crate) fn new<F>(inner: F, setup: Setup, validate: Validate) -> Self
    where
        F: GraphicsFlow<FrameCounter, ()> + 'static,
    {
        Self {
            inner: Box::new(inner),
            setup,
            validate,
        }
    }
}

impl GraphicsFlow<FrameCounter, ()> for TestRender {
    fn on_init(&mut self, ctx: &mut Context, state: &mut FrameCounter) -> Out<FrameCounter, ()> {
        let out = self.inner.on_init(ctx, state);
        (self.setup)(ctx);
        out
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut FrameCounter,
        dt: instant::Duration,
    ) -> Out<FrameCounter, ()> {
        state.progress();
        self.inner.on_update(ctx, state, dt)
    }

    fn on_render(&self) -> Render<'_> {
        self.inner.on_render()
    }

    fn render_to_texture(
        &self,
        _: &Context,
        state: &mut FrameCounter,
        texture: &image::RgbaImage,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(state, texture)
    }
}

pub(crate) fn center_pixel(texture: &image::RgbaImage) -> image::Rgba<u8> {
    *texture.get_pixel(texture.width() / 2, texture.height() / 2)
}

#[macro_export]
macro_rules! golden_image_test {
    ($graphics_elem:expr) => {{
        use crate::common::test_utils::FrameCounter;
        use orbit_scene::flow::{FlowConsturctor, GraphicsFlow};
        let model_constructor: FlowConsturctor<FrameCounter, ()> = Box::new(|init| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter, ()>> = Box::new(($graphics_elem)(init));
                g_flow
            })
        });

        orbit_scene::flow::run(vec![model_constructor])
            .expect("Failed to run flow for integration test.");
    }};
}

/// A device without a window, for tests that only upload resources.
pub(crate) fn headless_device() -> (wgpu::Device, wgpu::Queue) {
    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .expect("No graphics adapter available for the test");
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .expect("Could not create a device for the test")
    })
}
