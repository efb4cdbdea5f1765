//! The composed scene: canvas, ambient light, a remote model, interactive
//! boxes and orbit controls.
//!
//! Each part is its own [`GraphicsFlow`](crate::flow::GraphicsFlow).
//! [`SceneBuilder`] turns a [`SceneConfig`] into the list of flow
//! constructors the event loop runs.

use cgmath::Vector3;

use crate::{
    config::SceneConfig,
    context::InitContext,
    data_structures::scene_graph::SceneNode,
    flow::{self, FlowConsturctor, GraphicsFlow},
    resources::loader::{DracoLoader, GltfLoader, Ktx2Loader},
};

pub mod boxes;
pub mod canvas;
pub mod model;

pub use boxes::BoxesFlow;
pub use canvas::CanvasFlow;
pub use model::ModelFlow;

/// Events the scene flows exchange through the event loop.
pub enum SceneEvent {
    /// A model finished loading, successfully or not.
    ModelLoaded {
        url: String,
        result: anyhow::Result<Box<dyn SceneNode>>,
    },
}

impl std::fmt::Debug for SceneEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelLoaded { url, result } => f
                .debug_struct("ModelLoaded")
                .field("url", url)
                .field("ok", &result.is_ok())
                .finish(),
        }
    }
}

/// State shared by all scene flows.
#[derive(Debug, Default)]
pub struct SceneState {
    /// Models that are on screen.
    pub loaded_models: Vec<String>,
    /// Models that failed to load, with the error.
    pub failed_models: Vec<(String, String)>,
}

/// Composes the scene out of its parts.
///
/// ```no_run
/// use orbit_scene::{config::SceneConfig, scene::SceneBuilder};
///
/// let flows = SceneBuilder::new(SceneConfig::default())
///     .ambient_light(std::f32::consts::PI / 2.0)
///     .gltf("https://example.com/model.glb")
///     .rotating_box([-1.2, 0.0, 0.0].into())
///     .rotating_box([1.2, 0.0, 0.0].into())
///     .orbit_controls()
///     .build();
/// orbit_scene::flow::run(flows).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct SceneBuilder {
    config: SceneConfig,
    ambient: Option<f32>,
    models: Vec<String>,
    boxes: Vec<Vector3<f32>>,
    orbit_controls: bool,
}

impl SceneBuilder {
    /// An empty composition. Camera, clear colour and decoder locations
    /// come from `config`; everything else is added with the builder.
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            ambient: None,
            models: Vec::new(),
            boxes: Vec::new(),
            orbit_controls: false,
        }
    }

    /// The composition described by `config`.
    pub fn from_config(config: SceneConfig) -> Self {
        let mut builder = Self::new(config.clone()).ambient_light(config.ambient_intensity);
        if let Some(url) = &config.model_url {
            builder = builder.gltf(url.clone());
        }
        for position in &config.boxes {
            builder = builder.rotating_box(*position);
        }
        if config.orbit_controls {
            builder = builder.orbit_controls();
        }
        builder
    }

    pub fn ambient_light(mut self, intensity: f32) -> Self {
        self.ambient = Some(intensity);
        self
    }

    pub fn gltf(mut self, url: impl Into<String>) -> Self {
        self.models.push(url.into());
        self
    }

    pub fn rotating_box(mut self, position: Vector3<f32>) -> Self {
        self.boxes.push(position);
        self
    }

    pub fn orbit_controls(mut self) -> Self {
        self.orbit_controls = true;
        self
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn ambient(&self) -> Option<f32> {
        self.ambient
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn boxes(&self) -> &[Vector3<f32>] {
        &self.boxes
    }

    pub fn has_orbit_controls(&self) -> bool {
        self.orbit_controls
    }

    /// Loader with the Draco and KTX2 plugins configured from the config.
    /// Texture support is filled in once the device exists.
    pub fn loader(&self) -> GltfLoader {
        let mut draco = DracoLoader::new();
        draco
            .set_decoder_path(self.config.draco_decoder_path.clone())
            .set_decoder_config(self.config.draco_decoder_type);
        let mut ktx2 = Ktx2Loader::new();
        ktx2.set_transcoder_path(self.config.ktx2_transcoder_path.clone());
        let mut loader = GltfLoader::new();
        loader.set_draco_loader(draco).set_ktx2_loader(ktx2);
        loader
    }

    /// Canvas first so its configuration is in place before the other
    /// flows initialise.
    pub fn build(self) -> Vec<FlowConsturctor<SceneState, SceneEvent>> {
        let mut constructors: Vec<FlowConsturctor<SceneState, SceneEvent>> = Vec::new();

        let canvas = CanvasFlow::new(&self.config, self.ambient, self.orbit_controls);
        let canvas_constructor: FlowConsturctor<SceneState, SceneEvent> = Box::new(|_| {
            Box::pin(async move { Box::new(canvas) as Box<dyn GraphicsFlow<_, _>> })
        });
        constructors.push(canvas_constructor);

        let fit_offset = self
            .config
            .fit_camera_on_load
            .then_some(self.config.fit_offset);
        for url in &self.models {
            let url = url.clone();
            let loader = self.loader();
            let model_constructor: FlowConsturctor<SceneState, SceneEvent> =
                Box::new(move |init: InitContext| {
                    Box::pin(async move {
                        Box::new(ModelFlow::new(url, loader, &init, fit_offset))
                            as Box<dyn GraphicsFlow<_, _>>
                    })
                });
            constructors.push(model_constructor);
        }

        if !self.boxes.is_empty() {
            let positions = self.boxes;
            let boxes_constructor: FlowConsturctor<SceneState, SceneEvent> =
                Box::new(move |init: InitContext| {
                    Box::pin(async move {
                        Box::new(BoxesFlow::new(&init.device, &init.queue, &positions))
                            as Box<dyn GraphicsFlow<_, _>>
                    })
                });
            constructors.push(boxes_constructor);
        }

        log::debug!("Scene composed of {} flows", constructors.len());
        constructors
    }
}

/// Open a window and show the scene described by `config`.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    flow::run(SceneBuilder::from_config(config).build())
}
