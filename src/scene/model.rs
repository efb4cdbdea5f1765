//! A glTF model fetched in the background and shown once it arrives.

use instant::Duration;

use crate::{
    context::{Context, InitContext},
    data_structures::{aabb::Bounded, scene_graph::SceneNode},
    fit::fit_camera_to_object,
    flow::{GraphicsFlow, Out},
    render::Render,
    resources::loader::{GltfLoader, Ktx2Loader},
    scene::{SceneEvent, SceneState},
};

pub struct ModelFlow {
    url: String,
    loader: GltfLoader,
    device: wgpu::Device,
    queue: wgpu::Queue,
    root: Option<Box<dyn SceneNode>>,
    fit_offset: Option<f32>,
}

impl ModelFlow {
    /// `fit_offset` fits the camera to the model once it is loaded.
    pub fn new(url: String, mut loader: GltfLoader, init: &InitContext, fit_offset: Option<f32>) -> Self {
        let mut ktx2 = loader.ktx2_loader().cloned().unwrap_or_else(Ktx2Loader::new);
        ktx2.with_support(init.texture_support);
        loader.set_ktx2_loader(ktx2);
        Self {
            url,
            loader,
            device: init.device.clone(),
            queue: init.queue.clone(),
            root: None,
            fit_offset,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_loaded(&self) -> bool {
        self.root.is_some()
    }

    fn on_loaded(&mut self, ctx: &mut Context, mut root: Box<dyn SceneNode>) {
        root.update_world_transform_all();
        root.write_to_buffers(&ctx.queue);
        if let Some(offset) = self.fit_offset {
            if root.bounding_box().is_empty() {
                log::warn!("{} has no visible geometry, the camera is left as is", self.url);
                self.root = Some(root);
                return;
            }
            let controls = ctx
                .camera
                .controls
                .enabled
                .then_some(&mut ctx.camera.controls);
            let fit = fit_camera_to_object(
                &mut ctx.camera.camera,
                &mut ctx.projection,
                root.as_ref(),
                Some(offset),
                controls,
            );
            log::info!("Camera fitted to {}: {:?}", self.url, fit);
        }
        self.root = Some(root);
    }
}

impl std::fmt::Debug for ModelFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelFlow")
            .field("url", &self.url)
            .field("loaded", &self.is_loaded())
            .field("fit_offset", &self.fit_offset)
            .finish()
    }
}

impl GraphicsFlow<SceneState, SceneEvent> for ModelFlow {
    fn on_init(&mut self, _ctx: &mut Context, _state: &mut SceneState) -> Out<SceneState, SceneEvent> {
        let url = self.url.clone();
        let loader = self.loader.clone();
        let device = self.device.clone();
        let queue = self.queue.clone();
        Out::FutEvent(vec![Box::new(async move {
            let result = loader.load(&url, &device, &queue).await;
            SceneEvent::ModelLoaded { url, result }
        })])
    }

    fn on_update(&mut self, _ctx: &Context, _state: &mut SceneState, _dt: Duration) -> Out<SceneState, SceneEvent> {
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        ctx: &mut Context,
        state: &mut SceneState,
        event: SceneEvent,
    ) -> Option<SceneEvent> {
        match event {
            SceneEvent::ModelLoaded { url, result } if url == self.url => {
                match result {
                    Ok(root) => {
                        self.on_loaded(ctx, root);
                        state.loaded_models.push(url);
                    }
                    Err(e) => {
                        log::error!("Could not load model {}: {:#}", url, e);
                        state.failed_models.push((url, format!("{:#}", e)));
                    }
                }
                None
            }
            other => Some(other),
        }
    }

    fn on_render(&self) -> Render<'_> {
        match &self.root {
            Some(root) => Render::from(root.as_ref()),
            None => Render::None,
        }
    }
}
