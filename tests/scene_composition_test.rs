use std::f32::consts::PI;

use cgmath::Vector3;
use orbit_scene::{
    config::{MODEL_URL, SceneConfig, versioned_transcoder_path},
    resources::loader::DecoderType,
    scene::SceneBuilder,
};

#[test]
fn should_describe_the_default_scene() {
    let config = SceneConfig::default();

    assert_eq!(config.model_url.as_deref(), Some(MODEL_URL));
    assert_eq!(config.ambient_intensity, PI / 2.0);
    assert_eq!(config.boxes, vec![Vector3::new(-1.2, 0.0, 0.0), Vector3::new(1.2, 0.0, 0.0)]);
    assert_eq!(config.camera_position, Vector3::new(0.0, 0.0, 5.0));
    assert_eq!(config.fovy_degrees, 75.0);
    assert_eq!((config.znear, config.zfar), (0.1, 1000.0));
    assert_eq!(config.draco_decoder_type, DecoderType::Js);
    assert!(config.orbit_controls);
    assert!(!config.fit_camera_on_load);
}

#[test]
fn should_compose_scene_from_config() {
    let builder = SceneBuilder::from_config(SceneConfig::default());

    assert_eq!(builder.ambient(), Some(PI / 2.0));
    assert_eq!(builder.models(), &[MODEL_URL.to_string()]);
    assert_eq!(builder.boxes().len(), 2);
    assert!(builder.has_orbit_controls());
    // canvas, model and boxes
    assert_eq!(builder.build().len(), 3);
}

#[test]
fn should_start_empty_when_built_by_hand() {
    let builder = SceneBuilder::new(SceneConfig::default());

    assert_eq!(builder.ambient(), None);
    assert!(builder.models().is_empty());
    assert!(builder.boxes().is_empty());
    assert!(!builder.has_orbit_controls());
    assert_eq!(builder.build().len(), 1);
}

#[test]
fn should_chain_scene_parts() {
    let builder = SceneBuilder::new(SceneConfig::empty())
        .ambient_light(1.0)
        .gltf("a.glb")
        .gltf("b.glb")
        .rotating_box(Vector3::new(0.0, 1.0, 0.0))
        .orbit_controls();

    assert_eq!(builder.ambient(), Some(1.0));
    assert_eq!(builder.models(), &["a.glb".to_string(), "b.glb".to_string()]);
    assert_eq!(builder.boxes(), &[Vector3::new(0.0, 1.0, 0.0)]);
    assert!(builder.has_orbit_controls());
    assert_eq!(builder.build().len(), 4);
}

#[test]
fn should_leave_out_what_the_config_disables() {
    let config = SceneConfig::default()
        .without_model()
        .with_boxes(Vec::new())
        .with_orbit_controls(false);

    let builder = SceneBuilder::from_config(config);

    assert!(builder.models().is_empty());
    assert!(builder.boxes().is_empty());
    assert!(!builder.has_orbit_controls());
}

#[test]
fn should_configure_loader_plugins_from_config() {
    let config = SceneConfig::default()
        .with_draco_decoder("/decoders/", DecoderType::Wasm)
        .with_ktx2_transcoder_path(versioned_transcoder_path("150"));

    let loader = SceneBuilder::from_config(config).loader();

    let draco = loader.draco_loader().expect("draco plugin");
    assert_eq!(draco.decoder_path(), "/decoders/");
    assert_eq!(draco.decoder_type(), DecoderType::Wasm);
    let ktx2 = loader.ktx2_loader().expect("ktx2 plugin");
    assert_eq!(
        ktx2.transcoder_path(),
        "https://unpkg.com/three@0.150.x/examples/jsm/libs/basis/"
    );
    assert_eq!(ktx2.transcode_target(), None);
}
