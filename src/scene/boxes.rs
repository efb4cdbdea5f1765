//! Rotating boxes that react to hover and click.
//!
//! [`BoxSet`] holds the interaction logic and needs no GPU; [`BoxesFlow`]
//! pairs it with one model and instance buffer per box.

use cgmath::Vector3;
use instant::Duration;
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        aabb::Aabb,
        model::{Material, Mesh, Model},
        shapes::box_geometry,
        texture::Texture,
    },
    events::{Hit, NodeId, NodeTree, PointerDispatcher, PointerEvent},
    flow::{GraphicsFlow, Out, PointerInput, PointerKind},
    interaction::BoxState,
    raycast::Ray,
    render::{Instanced, Render},
    resources::texture::material_layout,
};

/// Node id of the group all boxes hang off.
pub const BOX_GROUP_ID: NodeId = 0;

#[derive(Clone, Debug, PartialEq)]
pub struct BoxEntity {
    pub id: NodeId,
    pub position: Vector3<f32>,
    pub state: BoxState,
}

/// Unit boxes under one group node, with hover and press tracking.
#[derive(Clone, Debug)]
pub struct BoxSet {
    entities: Vec<BoxEntity>,
    bounds: Aabb,
    tree: NodeTree,
    dispatcher: PointerDispatcher,
}

impl BoxSet {
    pub fn new(positions: &[Vector3<f32>]) -> Self {
        let mut tree = NodeTree::new();
        let entities = positions
            .iter()
            .enumerate()
            .map(|(idx, position)| {
                let id = idx as NodeId + 1;
                tree.set_parent(id, BOX_GROUP_ID);
                BoxEntity {
                    id,
                    position: *position,
                    state: BoxState::new(),
                }
            })
            .collect();
        Self {
            entities,
            bounds: Aabb::centered(Vector3::new(1.0, 1.0, 1.0)),
            tree,
            dispatcher: PointerDispatcher::new(),
        }
    }

    pub fn entities(&self) -> &[BoxEntity] {
        &self.entities
    }

    pub fn get(&self, id: NodeId) -> Option<&BoxEntity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Nearest box along `ray`, using each box's current transform.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<Hit> {
        self.entities
            .iter()
            .filter_map(|entity| {
                let world = entity.state.transform(entity.position).to_matrix();
                ray.intersect_transformed(&self.bounds, &world)
                    .map(|distance| (entity.id, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, distance)| Hit {
                path: self.tree.path_to_root(id),
                distance,
            })
    }

    /// Route a pointer event. `hit` is what lies under the cursor, `None`
    /// when another flow is closer or nothing was hit.
    pub fn pointer(&mut self, kind: PointerKind, hit: Option<&Hit>) {
        let entities = &mut self.entities;
        let mut handler = |event: &mut PointerEvent| {
            if let Some(entity) = entities
                .iter_mut()
                .find(|entity| entity.id == event.current_target)
            {
                entity.state.on_pointer(event);
            }
        };
        match kind {
            PointerKind::Move => self.dispatcher.pointer_move(hit, &mut handler),
            PointerKind::Down => self.dispatcher.pointer_down(hit, &mut handler),
            PointerKind::Up => self.dispatcher.pointer_up(hit, &mut handler),
            PointerKind::Leave => self.dispatcher.pointer_leave(&mut handler),
        }
    }

    /// Advance every box's rotation.
    pub fn tick(&mut self, dt: Duration) {
        self.entities
            .iter_mut()
            .for_each(|entity| entity.state.tick(dt));
    }
}

struct BoxGpu {
    model: Model,
    instance_buffer: wgpu::Buffer,
}

pub struct BoxesFlow {
    boxes: BoxSet,
    gpu: Vec<BoxGpu>,
}

impl BoxesFlow {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, positions: &[Vector3<f32>]) -> Self {
        let boxes = BoxSet::new(positions);
        let (vertices, indices) = box_geometry(1.0, 1.0, 1.0);
        let mesh = Mesh::new(device, "box", &vertices, &indices, 0);
        let layout = material_layout(device);
        let white = Texture::white(device, queue);

        let gpu = boxes
            .entities()
            .iter()
            .map(|entity| {
                let name = format!("box {}", entity.id);
                let material = Material::new(device, &name, entity.state.color(), white.clone(), &layout);
                let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} Instance Buffer", name)),
                    contents: bytemuck::cast_slice(&[entity.state.transform(entity.position).to_raw()]),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                BoxGpu {
                    model: Model {
                        meshes: vec![mesh.clone()],
                        materials: vec![material],
                    },
                    instance_buffer,
                }
            })
            .collect();

        Self { boxes, gpu }
    }

    pub fn boxes(&self) -> &BoxSet {
        &self.boxes
    }
}

impl std::fmt::Debug for BoxesFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxesFlow").field("boxes", &self.boxes).finish()
    }
}

impl<S, E> GraphicsFlow<S, E> for BoxesFlow {
    fn on_init(&mut self, _ctx: &mut Context, _state: &mut S) -> Out<S, E> {
        log::info!("{} interactive boxes", self.boxes.len());
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _state: &mut S, dt: Duration) -> Out<S, E> {
        self.boxes.tick(dt);
        for (entity, gpu) in self.boxes.entities().iter().zip(self.gpu.iter_mut()) {
            let raw = entity.state.transform(entity.position).to_raw();
            ctx.queue
                .write_buffer(&gpu.instance_buffer, 0, bytemuck::cast_slice(&[raw]));
            if let Some(material) = gpu.model.materials.first_mut() {
                material.set_base_color(&ctx.queue, entity.state.color());
            }
        }
        Out::Empty
    }

    fn hit_test(&self, ray: &Ray) -> Option<f32> {
        self.boxes.nearest_hit(ray).map(|hit| hit.distance)
    }

    fn on_pointer(&mut self, _ctx: &Context, _state: &mut S, input: PointerInput) -> Out<S, E> {
        let hit = match (input.is_target, input.ray) {
            (true, Some(ray)) => self.boxes.nearest_hit(&ray),
            _ => None,
        };
        self.boxes.pointer(input.kind, hit.as_ref());
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::Defaults(
            self.boxes
                .entities()
                .iter()
                .zip(self.gpu.iter())
                .map(|(entity, gpu)| Instanced {
                    instance: &gpu.instance_buffer,
                    model: &gpu.model,
                    amount: 1,
                    id: entity.id,
                })
                .collect(),
        )
    }
}
