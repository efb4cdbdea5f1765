//! Scene data structures: bounds, models, textures, instances and the scene graph.
//!
//! - `aabb` holds axis-aligned bounding boxes and the [`aabb::Bounded`] trait
//! - `model` contains mesh and material definitions, GPU resources for 3D models
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-node transformation data
//! - `shapes` builds procedural geometry such as the box mesh
//! - `scene_graph` enables hierarchical scene organization

pub mod aabb;
pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod shapes;
pub mod texture;
