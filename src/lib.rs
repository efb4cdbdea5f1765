//! orbit-scene
//!
//! A small 3D scene that runs natively and in the browser: a remote glTF
//! model under an ambient light, two rotating boxes that react to hover and
//! click, and orbit camera controls.
//!
//! High-level modules
//! - `flow`: event loop and the `GraphicsFlow` trait every scene part implements
//! - `context`: GPU and window context that owns device, queue, camera and pipelines
//! - `camera` / `controls` / `fit`: view, projection, orbit controls and fit-to-object
//! - `events` / `raycast` / `interaction`: pointer picking and per-box state
//! - `data_structures`: meshes, materials, instances, bounds and the scene graph
//! - `resources`: asset fetching and the glTF loader with its decoder plugins
//! - `pipelines` / `render`: the forward pipeline and render batching
//! - `config` / `scene`: scene configuration and composition
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod events;
pub mod fit;
pub mod flow;
pub mod interaction;
pub mod pipelines;
pub mod raycast;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::{Point3, Vector3};
pub use winit::event::WindowEvent;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point: renders the default scene into `#canvas`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    scene::run(config::SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
