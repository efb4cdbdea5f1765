//! Render composition.
//!
//! Flows describe what they want drawn with a [`Render`]. The event loop
//! flattens every flow's `Render` into one batch before the render pass
//! starts.

use crate::data_structures::model::Model;

/// A model drawn `amount` times from an instance buffer.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
    pub id: u32,
}

/// - `None` renders nothing
/// - `Defaults(Vec<Instanced>)` renders a batch of opaque instanced objects
pub enum Render<'a> {
    None,
    Defaults(Vec<Instanced<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, basics: &mut Vec<Instanced<'a>>) {
        match self {
            Render::Defaults(mut vec) => basics.append(&mut vec),
            Render::None => (),
        }
    }
}
