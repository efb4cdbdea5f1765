//! Scene configuration and the fixed remote asset locations.

use std::f32::consts::PI;

use cgmath::Vector3;

use crate::resources::loader::DecoderType;

/// Versioned Draco decoder scripts.
pub const DRACO_DECODER_LOCATION: &str = "https://www.gstatic.com/draco/versioned/decoders/1.4.1/";

/// Default versioned Basis Universal transcoder location.
pub const KTX2_TRANSCODER_LOCATION: &str =
    "https://www.gstatic.com/basis-universal/versioned/2021-04-15-ba1c3e4/";

/// The model shown by the default scene.
pub const MODEL_URL: &str =
    "https://needle-cloud-preview-02-r26roub2hq-lz.a.run.app/api/v1/public/1204a96/26b423147/";

/// Renderer revision the transcoder scripts are published for.
pub const RENDERER_REVISION: &str = "160";

/// Transcoder location published alongside the given renderer revision.
pub fn versioned_transcoder_path(revision: &str) -> String {
    format!("https://unpkg.com/three@0.{}.x/examples/jsm/libs/basis/", revision)
}

/// Everything the default scene can be tuned with.
///
/// Start from [`SceneConfig::default`] and override single values with the
/// `with_*` builders.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub model_url: Option<String>,
    pub draco_decoder_path: String,
    pub draco_decoder_type: DecoderType,
    pub ktx2_transcoder_path: String,
    pub ambient_intensity: f32,
    pub boxes: Vec<Vector3<f32>>,
    pub camera_position: Vector3<f32>,
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub clear_colour: wgpu::Color,
    pub orbit_controls: bool,
    pub fit_camera_on_load: bool,
    pub fit_offset: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_url: Some(MODEL_URL.to_string()),
            draco_decoder_path: DRACO_DECODER_LOCATION.to_string(),
            draco_decoder_type: DecoderType::Js,
            ktx2_transcoder_path: versioned_transcoder_path(RENDERER_REVISION),
            ambient_intensity: PI / 2.0,
            boxes: vec![Vector3::new(-1.2, 0.0, 0.0), Vector3::new(1.2, 0.0, 0.0)],
            camera_position: Vector3::new(0.0, 0.0, 5.0),
            fovy_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            clear_colour: wgpu::Color::BLACK,
            orbit_controls: true,
            fit_camera_on_load: false,
            fit_offset: crate::fit::DEFAULT_FIT_OFFSET,
        }
    }
}

impl SceneConfig {
    /// A config with no model, no boxes and no controls.
    pub fn empty() -> Self {
        Self {
            model_url: None,
            boxes: Vec::new(),
            orbit_controls: false,
            ..Default::default()
        }
    }

    pub fn with_model_url(mut self, url: impl Into<String>) -> Self {
        self.model_url = Some(url.into());
        self
    }

    pub fn without_model(mut self) -> Self {
        self.model_url = None;
        self
    }

    pub fn with_draco_decoder(mut self, path: impl Into<String>, decoder_type: DecoderType) -> Self {
        self.draco_decoder_path = path.into();
        self.draco_decoder_type = decoder_type;
        self
    }

    pub fn with_ktx2_transcoder_path(mut self, path: impl Into<String>) -> Self {
        self.ktx2_transcoder_path = path.into();
        self
    }

    pub fn with_ambient_intensity(mut self, intensity: f32) -> Self {
        self.ambient_intensity = intensity;
        self
    }

    pub fn with_boxes(mut self, boxes: Vec<Vector3<f32>>) -> Self {
        self.boxes = boxes;
        self
    }

    pub fn with_camera(mut self, position: Vector3<f32>, fovy_degrees: f32, znear: f32, zfar: f32) -> Self {
        self.camera_position = position;
        self.fovy_degrees = fovy_degrees;
        self.znear = znear;
        self.zfar = zfar;
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: wgpu::Color) -> Self {
        self.clear_colour = clear_colour;
        self
    }

    pub fn with_orbit_controls(mut self, enabled: bool) -> Self {
        self.orbit_controls = enabled;
        self
    }

    /// Frame the model with the camera once it has loaded.
    pub fn with_fit_camera_on_load(mut self, enabled: bool, offset: f32) -> Self {
        self.fit_camera_on_load = enabled;
        self.fit_offset = offset;
        self
    }
}
