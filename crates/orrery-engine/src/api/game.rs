use glam::Vec3;
use crate::api::types::{Command, EntityId, GameEvent, Notice, SoundEvent};
use crate::assets::loader::{AssetLoader, LoadCompletion};
use crate::assets::manifest::AssetManifest;
use crate::bridge::protocol::DEFAULT_MAX_LIGHTS;
use crate::components::entity::Entity;
use crate::core::rng::Rng;
use crate::core::scene::Scene;
use crate::extensions::transform::{LocalTransform, TransformGraph};
use crate::input::queue::InputQueue;
use crate::renderer::camera::Camera3D;
use crate::systems::lighting::LightState;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Upper bound on fixed steps run for one display frame (default: 10).
    pub max_steps_per_frame: u32,
    /// Side of the square drawing surface in CSS pixels (aspect is always 1:1).
    pub viewport_size: f32,
    /// Maximum number of render instances (default: 256).
    pub max_instances: usize,
    /// Maximum number of point lights (default: 8).
    pub max_lights: usize,
    /// Maximum number of sound events per frame (default: 16).
    pub max_sounds: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            max_steps_per_frame: 10,
            viewport_size: 800.0,
            max_instances: 256,
            max_lights: DEFAULT_MAX_LIGHTS,
            max_sounds: 16,
            max_events: 32,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, configure the scene.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One fixed simulation tick. `ctx.dt()` is the tick length in seconds.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// A control-panel command. Runs synchronously, between ticks.
    fn command(&mut self, _ctx: &mut EngineContext, _command: &Command) {}

    /// A still-wanted asset request finished (cancelled requests never arrive).
    fn asset_loaded(&mut self, _ctx: &mut EngineContext, _completion: LoadCompletion) {}

    /// The host supplied its asset manifest.
    fn manifest_loaded(&mut self, _ctx: &mut EngineContext, _manifest: &AssetManifest) {}

    /// State the host UI renders (dropdowns, fields). Serialized to JSON on request.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Mutable access to engine state, passed to every `Game` hook.
pub struct EngineContext {
    pub scene: Scene,
    pub transforms: TransformGraph,
    pub camera: Camera3D,
    pub lights: LightState,
    pub assets: AssetLoader,
    pub rng: Rng,
    pub sounds: Vec<SoundEvent>,
    pub events: Vec<GameEvent>,
    notices: Vec<Notice>,
    dt: f32,
    next_id: u32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    /// Create a context whose RNG starts from `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            scene: Scene::new(),
            transforms: TransformGraph::new(),
            camera: Camera3D::default(),
            lights: LightState::new(),
            assets: AssetLoader::new(),
            rng: Rng::new(seed),
            sounds: Vec::new(),
            events: Vec::new(),
            notices: Vec::new(),
            dt: 1.0 / 60.0,
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Length of the current tick in seconds.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn set_dt(&mut self, dt: f32) {
        self.dt = dt;
    }

    /// Spawn a top-level entity. It is registered in the transform graph so
    /// children can be attached to it later.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        let local = LocalTransform {
            offset: entity.pos,
            rotation: entity.rotation,
            scale: entity.scale,
        };
        self.transforms.register_with(id, local);
        self.scene.spawn(entity);
        id
    }

    /// Spawn an entity whose transform is composed with `parent`'s.
    pub fn spawn_child(&mut self, entity: Entity, parent: EntityId, local: LocalTransform) -> EntityId {
        let id = entity.id;
        self.transforms.register_with(id, local);
        self.transforms.set_parent(id, Some(parent));
        self.scene.spawn(entity);
        id
    }

    /// Despawn an entity together with all of its children.
    /// Returns the number of scene entities removed.
    pub fn despawn(&mut self, id: EntityId) -> usize {
        let mut ids = self.transforms.remove_subtree(id);
        if ids.is_empty() {
            ids.push(id);
        }
        self.scene.despawn_many(&ids)
    }

    /// Move a top-level entity; children follow on the next propagate.
    pub fn set_transform(&mut self, id: EntityId, pos: Vec3, rotation: glam::Quat, scale: Vec3) {
        self.transforms.set_local(id, LocalTransform { offset: pos, rotation, scale });
    }

    /// Emit a sound event to be forwarded to the host.
    pub fn emit_sound(&mut self, event: SoundEvent) {
        self.sounds.push(event);
    }

    /// Emit a game event to be forwarded to the host.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Queue a user-facing notice (alert/confirm) for the host.
    pub fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand all queued notices to the host.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Clear per-frame transient data (sounds, events). Notices persist until taken.
    pub fn clear_frame_data(&mut self) {
        self.sounds.clear();
        self.events.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn despawn_takes_children_along() {
        let mut ctx = EngineContext::new();
        let planet = ctx.next_id();
        ctx.spawn(Entity::new(planet).with_pos(Vec3::new(15.0, 0.0, 0.0)));
        let ring = ctx.next_id();
        ctx.spawn_child(Entity::new(ring), planet, LocalTransform::new());
        let other = ctx.next_id();
        ctx.spawn(Entity::new(other));

        assert_eq!(ctx.despawn(planet), 2);
        assert_eq!(ctx.scene.len(), 1);
        assert!(ctx.scene.contains(other));
    }

    #[test]
    fn set_transform_moves_children_on_propagate() {
        let mut ctx = EngineContext::new();
        let sun = ctx.next_id();
        ctx.spawn(Entity::new(sun));
        let glow = ctx.next_id();
        ctx.spawn_child(Entity::new(glow), sun, LocalTransform::new().with_scale(Vec3::splat(1.2)));

        ctx.set_transform(sun, Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::ONE);
        ctx.transforms.propagate(&mut ctx.scene);

        let glow_entity = ctx.scene.get(glow).unwrap();
        assert_eq!(glow_entity.pos, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(glow_entity.scale, Vec3::splat(1.2));
    }

    #[test]
    fn notices_persist_across_frames_until_taken() {
        let mut ctx = EngineContext::new();
        ctx.notify(Notice::error("nope"));
        ctx.clear_frame_data();
        assert_eq!(ctx.notices().len(), 1);
        assert_eq!(ctx.take_notices().len(), 1);
        assert!(ctx.notices().is_empty());
    }
}
