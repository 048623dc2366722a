// extensions/transform.rs
//
// Transform hierarchy for composite bodies.
// A decoration (planet ring, sun glow shell) is a child node: it is never
// integrated on its own, its world transform is the parent's composed with
// its local offset/rotation/scale.
//
// Usage:
//   graph.register_with(ring_id, LocalTransform::new().with_rotation(tilt));
//   graph.set_parent(ring_id, Some(planet_id));
//   graph.set_local(planet_id, planet_world_transform);
//   graph.propagate(&mut scene);

use std::collections::HashMap;
use glam::{Quat, Vec3};
use crate::api::types::EntityId;
use crate::core::scene::Scene;

/// Local transform data for entities in a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    /// Position relative to parent (or world if no parent).
    pub offset: Vec3,
    /// Rotation relative to parent.
    pub rotation: Quat,
    /// Scale multiplier relative to parent.
    pub scale: Vec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl LocalTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

#[derive(Debug, Clone, Default)]
struct TransformNode {
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    local: LocalTransform,
}

/// Parent-child relationships between scene entities.
///
/// Lives beside the Scene; only entities registered here are touched by `propagate`.
#[derive(Debug, Default)]
pub struct TransformGraph {
    nodes: HashMap<EntityId, TransformNode>,
    /// Entities with no parent (top-level).
    roots: Vec<EntityId>,
    /// Set when hierarchy or a local transform changes, cleared after propagate.
    dirty: bool,
}

impl TransformGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity with a specific local transform.
    pub fn register_with(&mut self, id: EntityId, local: LocalTransform) {
        let node = self.nodes.entry(id).or_default();
        node.local = local;
        if node.parent.is_none() && !self.roots.contains(&id) {
            self.roots.push(id);
        }
        self.dirty = true;
    }

    /// Register an entity with an identity local transform.
    pub fn register(&mut self, id: EntityId) {
        self.register_with(id, LocalTransform::default());
    }

    /// Set the parent of an entity. Pass `None` to make it a root.
    pub fn set_parent(&mut self, child: EntityId, parent: Option<EntityId>) {
        self.nodes.entry(child).or_default();
        if let Some(p) = parent {
            self.nodes.entry(p).or_default();
            if !self.roots.contains(&p) && self.nodes[&p].parent.is_none() {
                self.roots.push(p);
            }
        }

        if let Some(old_parent) = self.nodes.get(&child).and_then(|n| n.parent) {
            if let Some(old_node) = self.nodes.get_mut(&old_parent) {
                old_node.children.retain(|&c| c != child);
            }
        }

        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = parent;
        }

        match parent {
            Some(p) => {
                if let Some(parent_node) = self.nodes.get_mut(&p) {
                    if !parent_node.children.contains(&child) {
                        parent_node.children.push(child);
                    }
                }
                self.roots.retain(|&r| r != child);
            }
            None => {
                if !self.roots.contains(&child) {
                    self.roots.push(child);
                }
            }
        }

        self.dirty = true;
    }

    /// Set the local transform for an entity.
    pub fn set_local(&mut self, id: EntityId, local: LocalTransform) {
        if let Some(node) = self.nodes.get_mut(&id) {
            if node.local != local {
                node.local = local;
                self.dirty = true;
            }
        }
    }

    pub fn get_parent(&self, id: EntityId) -> Option<EntityId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn get_children(&self, id: EntityId) -> Option<&[EntityId]> {
        self.nodes.get(&id).map(|n| n.children.as_slice())
    }

    /// Remove an entity and all of its descendants from the hierarchy.
    /// Returns the removed ids (the entity first), so the caller can despawn them.
    pub fn remove_subtree(&mut self, id: EntityId) -> Vec<EntityId> {
        let mut removed = Vec::new();
        let Some(node) = self.nodes.get(&id) else { return removed };

        if let Some(parent) = node.parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|&c| c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                removed.push(current);
            }
        }
        self.roots.retain(|r| !removed.contains(r));
        self.dirty = true;
        removed
    }

    /// Propagate transforms from roots down through the hierarchy.
    /// Writes world pos/rotation/scale into the scene's entities.
    pub fn propagate(&mut self, scene: &mut Scene) {
        if !self.dirty {
            return;
        }
        for &root in &self.roots {
            self.propagate_recursive(root, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE, scene);
        }
        self.dirty = false;
    }

    fn propagate_recursive(
        &self,
        id: EntityId,
        parent_pos: Vec3,
        parent_rot: Quat,
        parent_scale: Vec3,
        scene: &mut Scene,
    ) {
        let Some(node) = self.nodes.get(&id) else { return };
        let local = &node.local;

        let world_pos = parent_pos + parent_rot * (local.offset * parent_scale);
        let world_rot = parent_rot * local.rotation;
        let world_scale = parent_scale * local.scale;

        if let Some(entity) = scene.get_mut(id) {
            entity.pos = world_pos;
            entity.rotation = world_rot;
            entity.scale = world_scale;
        }

        for &child in &node.children {
            self.propagate_recursive(child, world_pos, world_rot, world_scale, scene);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of entities in the hierarchy.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Entity;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn parent_child_relationship() {
        let mut graph = TransformGraph::new();
        let parent = EntityId(1);
        let child = EntityId(2);

        graph.register(parent);
        graph.register(child);
        graph.set_parent(child, Some(parent));

        assert_eq!(graph.get_parent(child), Some(parent));
        assert_eq!(graph.get_children(parent), Some([child].as_slice()));
        assert!(!graph.roots.contains(&child));
    }

    #[test]
    fn child_inherits_parent_spin_and_scale() {
        let mut graph = TransformGraph::new();
        let mut scene = Scene::new();
        let planet = EntityId(1);
        let ring = EntityId(2);
        scene.spawn(Entity::new(planet));
        scene.spawn(Entity::new(ring));

        graph.register_with(ring, LocalTransform::new().with_offset(Vec3::new(0.0, 0.0, -1.0)));
        graph.set_parent(ring, Some(planet));
        graph.set_local(
            planet,
            LocalTransform::new()
                .with_offset(Vec3::new(15.0, 0.0, 0.0))
                .with_rotation(Quat::from_rotation_y(FRAC_PI_2))
                .with_scale(Vec3::splat(2.0)),
        );
        graph.propagate(&mut scene);

        let ring_entity = scene.get(ring).unwrap();
        // (0,0,-1) scaled by 2 and spun a quarter turn about +Y → (-2, 0, 0)
        assert!((ring_entity.pos - Vec3::new(13.0, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(ring_entity.scale, Vec3::splat(2.0));
        assert!(ring_entity.rotation.angle_between(Quat::from_rotation_y(FRAC_PI_2)) < 1e-5);
    }

    #[test]
    fn remove_subtree_returns_descendants() {
        let mut graph = TransformGraph::new();
        let sun = EntityId(1);
        let glow = EntityId(2);
        let flare = EntityId(3);
        graph.register(sun);
        graph.set_parent(glow, Some(sun));
        graph.set_parent(flare, Some(glow));

        let removed = graph.remove_subtree(sun);
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0], sun);
        assert!(graph.is_empty());
    }

    #[test]
    fn unchanged_local_keeps_graph_clean() {
        let mut graph = TransformGraph::new();
        let mut scene = Scene::new();
        let id = EntityId(1);
        graph.register(id);
        graph.propagate(&mut scene);
        graph.set_local(id, LocalTransform::default());
        assert!(!graph.is_dirty());
    }
}
