//! The scene graph shared by every rendering context of a viewer.
//!
//! Objects are flattened into an arena of [`SceneNode`]s addressed by
//! [`NodeId`]. Slots freed by [`Scene::remove_subtree`] are reused with a
//! bumped slot generation, and every [`Scene::clear`] starts a new scene
//! generation. Either way an id handed out earlier never resolves again, which
//! is how stale selections are detected.

use glam::{Mat4, Vec3};

use crate::bounds::Aabb;
use crate::color::Color;
use crate::error::{FlowscopeError, Result};
use crate::object::{Capability, Object3D, ObjectId, ObjectKind, Transform};
use crate::ray::Ray;
use crate::selection::SelectorHandle;

/// Background color of a fresh scene.
pub const DEFAULT_BACKGROUND: u32 = 0x0042_4242;

/// Address of a node within one scene generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    slot_generation: u32,
    scene_generation: u32,
}

/// A flattened object node.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub object: ObjectId,
    pub name: String,
    pub kind: ObjectKind,
    pub transform: Transform,
    pub visible: bool,
    pub capability: Capability,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        matches!(self.capability, Capability::Selectable(_))
    }

    #[must_use]
    pub fn selector(&self) -> Option<&SelectorHandle> {
        match &self.capability {
            Capability::Selectable(handle) => Some(handle),
            Capability::Plain => None,
        }
    }

    /// Whether the node and its material (if any) are visible. Material
    /// visibility applies to this node only, never to its children.
    #[must_use]
    pub fn is_drawn(&self) -> bool {
        match &self.kind {
            ObjectKind::Mesh { material, .. } => self.visible && material.visible,
            _ => self.visible,
        }
    }
}

/// A ray hit against a mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    pub object: ObjectId,
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// A mutable tree of object nodes.
#[derive(Debug, Clone)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<NodeId>,
    generation: u32,
    revision: u64,
    background: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            roots: Vec::new(),
            generation: 0,
            revision: 0,
            background: Color::from_hex(DEFAULT_BACKGROUND),
        }
    }

    #[must_use]
    pub fn background(&self) -> Color {
        self.background
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
        self.revision += 1;
    }

    /// Incremented by every [`Scene::clear`].
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Incremented by every structural change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Removes every node and invalidates all previously issued ids.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.roots.clear();
        self.generation = self.generation.wrapping_add(1);
        self.revision += 1;
    }

    /// Adds an object tree at the root. Returns the id of its top node.
    pub fn add(&mut self, object: Object3D) -> NodeId {
        let id = self.insert(None, object);
        self.roots.push(id);
        self.revision += 1;
        id
    }

    /// Adds an object tree under `parent`.
    pub fn add_child(&mut self, parent: NodeId, object: Object3D) -> Result<NodeId> {
        if !self.contains(parent) {
            log::debug!("cannot add '{}' under stale node {parent:?}", object.name());
            return Err(FlowscopeError::StaleNode);
        }
        let id = self.insert(Some(parent), object);
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        self.revision += 1;
        Ok(id)
    }

    fn insert(&mut self, parent: Option<NodeId>, object: Object3D) -> NodeId {
        let Object3D {
            id: object_id,
            name,
            kind,
            transform,
            visible,
            capability,
            children,
        } = object;
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                #[allow(clippy::cast_possible_truncation)]
                let index = self.slots.len() as u32;
                self.slots.push(Slot::default());
                index
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = NodeId {
            index,
            slot_generation: slot.generation,
            scene_generation: self.generation,
        };
        slot.node = Some(SceneNode {
            object: object_id,
            name,
            kind,
            transform,
            visible,
            capability,
            parent,
            children: Vec::with_capacity(children.len()),
        });
        let child_ids: Vec<NodeId> = children
            .into_iter()
            .map(|child| self.insert(Some(id), child))
            .collect();
        if let Some(node) = self.node_mut(id) {
            node.children = child_ids;
        }
        id
    }

    /// Detaches `id` from its parent and drops its whole subtree.
    pub fn remove_subtree(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).map(SceneNode::parent) else {
            return false;
        };
        match parent.and_then(|p| self.node_mut(p)) {
            Some(parent_node) => parent_node.children.retain(|&c| c != id),
            None => self.roots.retain(|&c| c != id),
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                stack.extend(node.children);
            }
        }
        self.revision += 1;
        true
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        if id.scene_generation != self.generation {
            return None;
        }
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.slot_generation {
            return None;
        }
        slot.node.as_ref()
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        if id.scene_generation != self.generation {
            return None;
        }
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.slot_generation {
            return None;
        }
        slot.node.as_mut()
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `id`; empty for stale ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First node carrying the given object.
    #[must_use]
    pub fn find(&self, object: ObjectId) -> Option<NodeId> {
        self.traverse()
            .into_iter()
            .find(|&id| self.node(id).is_some_and(|n| n.object == object))
    }

    /// Every live node, depth first, parents before children.
    #[must_use]
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(id);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Nodes of the subtree rooted at `id`, including `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.node(current) {
                out.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }

    /// Node-to-world transform.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.node(c)) {
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Visible only if the node, its own material and all of its ancestors
    /// are. Ancestor materials do not count.
    #[must_use]
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.is_drawn() {
            return false;
        }
        let mut current = node.parent;
        while let Some(ancestor) = current.and_then(|a| self.node(a)) {
            if !ancestor.visible {
                return false;
            }
            current = ancestor.parent;
        }
        true
    }

    /// Every node carrying the selectable capability.
    #[must_use]
    pub fn selectable_nodes(&self) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(SceneNode::is_selectable))
            .collect()
    }

    /// World-space bounding box of a mesh node's own geometry.
    #[must_use]
    pub fn mesh_world_box(&self, id: NodeId) -> Aabb {
        match self.node(id).map(|n| &n.kind) {
            Some(ObjectKind::Mesh { geometry, .. }) => {
                geometry.bounding_box().transformed(&self.world_matrix(id))
            }
            _ => Aabb::EMPTY,
        }
    }

    /// Casts a ray against every mesh node, closest hit first.
    ///
    /// Visibility is not considered here; callers filter hits as needed.
    #[must_use]
    pub fn raycast(&self, ray: &Ray) -> Vec<Intersection> {
        let mut hits = Vec::new();
        for id in self.traverse() {
            let Some(node) = self.node(id) else { continue };
            let ObjectKind::Mesh { geometry, .. } = &node.kind else {
                continue;
            };
            let world = self.world_matrix(id);
            if ray
                .intersect_aabb(&geometry.bounding_box().transformed(&world))
                .is_none()
            {
                continue;
            }
            let local = ray.transformed(&world.inverse());
            if let Some(t) = geometry.intersect_ray(&local) {
                hits.push(Intersection {
                    node: id,
                    object: node.object,
                    distance: t,
                    point: ray.at(t),
                });
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}
