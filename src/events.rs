//! Pointer events for scene nodes.
//!
//! A hit test yields a *path*: the node under the cursor followed by its
//! ancestors up to the root. Events bubble along that path until a handler
//! calls [`PointerEvent::stop_propagation`]. [`PointerDispatcher`] keeps the
//! hover and press bookkeeping between cursor updates so that nodes get
//! `Over`/`Out` pairs and `Click` only fires when press and release land on
//! the same node.

use std::collections::HashMap;

/// Identifies a pickable node within one flow.
pub type NodeId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Over,
    Out,
    Down,
    Up,
    Click,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// The node that was hit.
    pub target: NodeId,
    /// The node whose handler is running.
    pub current_target: NodeId,
    /// Distance from the ray origin to the hit, if the event comes from a hit.
    pub distance: Option<f32>,
    stopped: bool,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, target: NodeId, distance: Option<f32>) -> Self {
        Self {
            kind,
            target,
            current_target: target,
            distance,
            stopped: false,
        }
    }

    /// Prevent ancestors of the current node from seeing this event.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped
    }
}

/// Result of a hit test: the hit node first, then its ancestors.
#[derive(Clone, Debug, PartialEq)]
pub struct Hit {
    pub path: Vec<NodeId>,
    pub distance: f32,
}

impl Hit {
    pub fn target(&self) -> Option<NodeId> {
        self.path.first().copied()
    }
}

/// Parent links of pickable nodes.
#[derive(Clone, Debug, Default)]
pub struct NodeTree {
    parents: HashMap<NodeId, NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) {
        self.parents.insert(child, parent);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// `id` followed by all of its ancestors.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            // guard against accidental cycles
            if path.contains(&parent) {
                log::warn!("Cycle in node tree at node {}", parent);
                break;
            }
            path.push(parent);
            current = parent;
        }
        path
    }
}

/// Deliver `event` to each node on `path` in order until propagation stops.
/// Returns the nodes that saw the event.
pub fn bubble(
    mut event: PointerEvent,
    path: &[NodeId],
    handler: &mut dyn FnMut(&mut PointerEvent),
) -> Vec<NodeId> {
    let mut reached = Vec::with_capacity(path.len());
    for &node in path {
        event.current_target = node;
        handler(&mut event);
        reached.push(node);
        if event.is_propagation_stopped() {
            break;
        }
    }
    reached
}

#[derive(Clone, Debug, Default)]
pub struct PointerDispatcher {
    hover_target: Option<NodeId>,
    hovered: Vec<NodeId>,
    pressed: Option<NodeId>,
}

impl PointerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes currently considered hovered, i.e. those that received the last
    /// `Over` and no `Out` since.
    pub fn hovered(&self) -> &[NodeId] {
        &self.hovered
    }

    pub fn hover_target(&self) -> Option<NodeId> {
        self.hover_target
    }

    /// The cursor moved; `hit` is what is under it now.
    pub fn pointer_move(&mut self, hit: Option<&Hit>, handler: &mut dyn FnMut(&mut PointerEvent)) {
        let target = hit.and_then(Hit::target);
        if target == self.hover_target {
            return;
        }
        if let Some(old) = self.hover_target.take() {
            for node in std::mem::take(&mut self.hovered) {
                let mut event = PointerEvent::new(PointerEventKind::Out, old, None);
                event.current_target = node;
                handler(&mut event);
            }
        }
        if let (Some(hit), Some(target)) = (hit, target) {
            let event = PointerEvent::new(PointerEventKind::Over, target, Some(hit.distance));
            self.hovered = bubble(event, &hit.path, handler);
            self.hover_target = Some(target);
        }
    }

    /// The cursor left the canvas.
    pub fn pointer_leave(&mut self, handler: &mut dyn FnMut(&mut PointerEvent)) {
        self.pointer_move(None, handler);
        self.pressed = None;
    }

    pub fn pointer_down(&mut self, hit: Option<&Hit>, handler: &mut dyn FnMut(&mut PointerEvent)) {
        self.pressed = None;
        if let Some(hit) = hit {
            if let Some(target) = hit.target() {
                let event = PointerEvent::new(PointerEventKind::Down, target, Some(hit.distance));
                bubble(event, &hit.path, handler);
                self.pressed = Some(target);
            }
        }
    }

    /// Emits `Up` on the hit node and `Click` if it was also the pressed node.
    pub fn pointer_up(&mut self, hit: Option<&Hit>, handler: &mut dyn FnMut(&mut PointerEvent)) {
        let pressed = self.pressed.take();
        let Some(hit) = hit else {
            return;
        };
        let Some(target) = hit.target() else {
            return;
        };
        let event = PointerEvent::new(PointerEventKind::Up, target, Some(hit.distance));
        bubble(event, &hit.path, handler);
        if pressed == Some(target) {
            let event = PointerEvent::new(PointerEventKind::Click, target, Some(hit.distance));
            bubble(event, &hit.path, handler);
        }
    }
}
