//! Scene graph and hierarchical scene organization.
//!
//! Nodes hold a local transform and a cached world transform. Geometry lives
//! in [`ModelNode`]s; [`ContainerNode`]s only group children. Loaded glTF
//! scenes are converted into this structure by [`to_scene_node`].

use wgpu::{Device, util::DeviceExt};

use crate::{
    data_structures::{
        aabb::{Aabb, Bounded},
        instance::{Instance, InstanceRaw},
        model::{self, ModelVertex},
    },
    render::{Instanced, Render},
};

pub trait SceneNode {
    fn get_local_transform(&self) -> &Instance;

    fn set_local_transform(&mut self, instance: Instance);

    fn get_world_transform(&self) -> &Instance;

    /// Recompute world transforms of `self` and all descendants.
    fn update_world_transforms(&mut self, parent_world_transform: &Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Upload world transforms of `self` and all descendants.
    fn write_to_buffers(&mut self, queue: &wgpu::Queue);

    /// Bounds of the node's own geometry in local space, if it has any.
    fn get_local_bounds(&self) -> Option<Aabb>;

    fn get_render(&self) -> Vec<Instanced<'_>>;

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&Instance::default());
    }
}

/// World-space bounds of a subtree. Uses the cached world transforms, so
/// call [`SceneNode::update_world_transforms`] first.
impl<'n> Bounded for dyn SceneNode + 'n {
    fn bounding_box(&self) -> Aabb {
        let own = self
            .get_local_bounds()
            .map(|bounds| bounds.transformed(&self.get_world_transform().to_matrix()))
            .unwrap_or_default();
        self.get_children()
            .iter()
            .fold(own, |acc, child| acc.union(&child.bounding_box()))
    }
}

impl<'a, N: SceneNode + ?Sized> From<&'a N> for Render<'a> {
    fn from(sn: &'a N) -> Self {
        Render::Defaults(sn.get_render())
    }
}

pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    local: Instance,
    world: Instance,
}

impl ContainerNode {
    pub fn new() -> Self {
        Self {
            children: vec![],
            local: Instance::default(),
            world: Instance::default(),
        }
    }
}

impl Default for ContainerNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneNode for ContainerNode {
    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    fn update_world_transforms(&mut self, parent_world_transform: &Instance) {
        self.world = parent_world_transform * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_local_bounds(&self) -> Option<Aabb> {
        None
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .collect()
    }
}

pub struct ModelNode {
    children: Vec<Box<dyn SceneNode>>,
    instance_buffer: wgpu::Buffer,
    local: Instance,
    world: Instance,
    model: model::Model,
    id: u32,
}

impl ModelNode {
    pub fn from_model(id: u32, device: &Device, model: model::Model) -> Self {
        let world = Instance::default();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Instance Buffer"),
            contents: bytemuck::cast_slice(&[world.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            children: vec![],
            instance_buffer,
            local: Instance::default(),
            world,
            model,
            id,
        }
    }
}

impl SceneNode for ModelNode {
    fn get_local_transform(&self) -> &Instance {
        &self.local
    }

    fn set_local_transform(&mut self, instance: Instance) {
        self.local = instance;
    }

    fn get_world_transform(&self) -> &Instance {
        &self.world
    }

    fn update_world_transforms(&mut self, parent_world_transform: &Instance) {
        self.world = parent_world_transform * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn write_to_buffers(&mut self, queue: &wgpu::Queue) {
        let raw: [InstanceRaw; 1] = [self.world.to_raw()];
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
        self.children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(queue));
    }

    fn get_local_bounds(&self) -> Option<Aabb> {
        let bounds = self.model.bounds();
        (!bounds.is_empty()).then_some(bounds)
    }

    fn get_render(&self) -> Vec<Instanced<'_>> {
        self.children
            .iter()
            .flat_map(|child| child.get_render())
            .chain([Instanced {
                instance: &self.instance_buffer,
                model: &self.model,
                amount: 1,
                id: self.id,
            }])
            .collect()
    }
}

/// Vertex data of one glTF primitive, or `None` if its positions are not
/// stored in plain buffers (e.g. Draco compressed).
pub fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[Vec<u8>],
) -> Option<(Vec<ModelVertex>, Vec<u32>)> {
    let positions = primitive.get(&gltf::Semantic::Positions)?;
    if positions.view().is_none() && positions.sparse().is_none() {
        return None;
    }
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()?
        .map(|position| ModelVertex {
            position,
            ..Default::default()
        })
        .collect();
    if let Some(normals) = reader.read_normals() {
        vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(vertex, normal)| vertex.normal = normal);
    }
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(vertex, uv)| vertex.tex_coords = uv);
    }
    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };
    Some((vertices, indices))
}

/// Convert a glTF node and its descendants into scene nodes.
///
/// `materials` are indexed like the document's materials followed by one
/// default material for primitives without any; each model keeps
/// clones of the handles it draws with. Primitives that cannot be read are
/// logged and left out.
pub fn to_scene_node(
    id: u32,
    node: gltf::scene::Node,
    buffers: &[Vec<u8>],
    device: &wgpu::Device,
    materials: &[model::Material],
) -> Box<dyn SceneNode> {
    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let name = mesh.name().unwrap_or("unknown_mesh");
            let mut meshes = Vec::new();
            // document material index -> index into `node_materials`
            let mut slots: Vec<(usize, usize)> = Vec::new();
            let mut node_materials: Vec<model::Material> = Vec::new();

            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!("Skipping non-triangle primitive in mesh {}", name);
                    continue;
                }
                let Some((vertices, indices)) = read_primitive(&primitive, buffers) else {
                    log::warn!(
                        "Primitive {} of mesh {} has no readable positions and is skipped",
                        primitive.index(),
                        name
                    );
                    continue;
                };
                // the last material is the loader's default one
                let material_idx = primitive
                    .material()
                    .index()
                    .unwrap_or(materials.len().saturating_sub(1));
                let slot = match slots.iter().find(|(doc, _)| *doc == material_idx) {
                    Some((_, slot)) => *slot,
                    None => {
                        let Some(material) = materials.get(material_idx) else {
                            log::warn!("Mesh {} references missing material {}", name, material_idx);
                            continue;
                        };
                        node_materials.push(material.clone());
                        slots.push((material_idx, node_materials.len() - 1));
                        node_materials.len() - 1
                    }
                };
                meshes.push(model::Mesh::new(device, name, &vertices, &indices, slot));
            }
            let model = model::Model {
                meshes,
                materials: node_materials,
            };
            Box::new(ModelNode::from_model(id, device, model))
        }
        None => Box::new(ContainerNode::new()),
    };

    let (translation, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(Instance {
        position: translation.into(),
        // glTF stores [x, y, z, w]
        rotation: cgmath::Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
        scale: scale.into(),
    });
    for child in node.children() {
        let child_node = to_scene_node(id, child, buffers, device, materials);
        scene_node.add_child(child_node);
    }

    scene_node
}
