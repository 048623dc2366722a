/// Solar System: free-fly orrery with live editing.
///
/// The `Simulation` owns all evolving state; this file mirrors it into
/// engine entities, turns panel commands into simulation calls, and reports
/// outcomes as notices.

use glam::{Quat, Vec3};
use orrery_engine::*;
use serde_json::json;

use crate::ambience::{CreditBanner, Music};
use crate::bodies;
use crate::config::SimConfig;
use crate::editor::{self, IntensityEdit, Target};
use crate::error::{SimError, SimResult};
use crate::navigator::{LookMode, Navigator};
use crate::registry::{BodyHandle, BodyKind, Removal};
use crate::scripted::ScriptedModel;
use crate::sim::Simulation;

// ── Command kinds from the control panel ─────────────────────────────

pub const CMD_SET_SIM_SPEED: u32 = 1;
pub const CMD_ADD_PLANET: u32 = 2;
pub const CMD_ADD_MOON: u32 = 3;
pub const CMD_ADD_COMET: u32 = 4;
pub const CMD_ADD_MODEL: u32 = 5;
pub const CMD_REMOVE: u32 = 6;
pub const CMD_SET_SPEED: u32 = 7;
pub const CMD_SET_SCALE: u32 = 8;
pub const CMD_SET_ROTATION: u32 = 9;
pub const CMD_SET_TEXTURE: u32 = 10;
pub const CMD_SET_INTENSITY: u32 = 11;
pub const CMD_TOGGLE_MUSIC: u32 = 12;

/// Second argument of `CMD_SET_INTENSITY` once the user has confirmed.
pub const CONFIRMED: &str = "confirmed";

// ── Game event kinds to the host ─────────────────────────────────────

/// a = credit banner opacity.
const EVENT_BANNER: f32 = 1.0;

/// Light intensity per unit of panel intensity.
const LIGHT_PER_INTENSITY: f32 = 0.02;
const AMBIENT: [f32; 3] = [0.08, 0.08, 0.1];
/// Start above the ecliptic, outside Neptune's orbit.
const CAMERA_START: Vec3 = Vec3::new(0.0, 10.0, 30.0);

struct SunVisuals {
    mesh: EntityId,
    glow: EntityId,
    light: LightId,
}

pub struct SolarSystem {
    sim: Simulation,
    navigator: Navigator,
    music: Music,
    banner: CreditBanner,
    manifest: AssetManifest,
    sun: Option<SunVisuals>,
}

impl SolarSystem {
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    pub fn with_config(config: SimConfig) -> Self {
        Self {
            navigator: Navigator::new(&config),
            banner: CreditBanner::new(config.banner_duration, config.banner_fade),
            music: Music::default(),
            manifest: AssetManifest::default(),
            sun: None,
            sim: Simulation::populated(config),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    // ── Spawning ───────────────────────────────────────────────────

    fn spawn_sun(&mut self, ctx: &mut EngineContext) {
        let mesh = ctx.next_id();
        ctx.spawn(
            Entity::new(mesh).with_tag("Sun").with_mesh(
                MeshComponent::sphere(bodies::SUN_RADIUS, Color::from_hex(bodies::SUN_COLOR))
                    .with_emissive(bodies::SUN_EMISSIVE),
            ),
        );
        let glow = ctx.next_id();
        ctx.spawn_child(
            Entity::new(glow).with_tag("Sun glow").with_mesh(
                MeshComponent::sphere(bodies::SUN_RADIUS, bodies::SUN_GLOW_COLOR)
                    .with_emissive(1.0)
                    .with_opacity(self.sim.sun.glow_opacity as f32),
            ),
            mesh,
            LocalTransform::new().with_scale(Vec3::splat(bodies::SUN_GLOW_SCALE)),
        );
        let light = ctx.lights.add(PointLight::new(
            Vec3::ZERO,
            [1.0, 1.0, 0.95],
            self.sim.sun.intensity as f32 * LIGHT_PER_INTENSITY,
            bodies::SUN_LIGHT_RANGE,
        ));
        self.sun = Some(SunVisuals { mesh, glow, light });
    }

    /// Create the mesh (and orbit path for planets) of a registry body, and
    /// request its texture.
    fn spawn_body(&mut self, ctx: &mut EngineContext, handle: BodyHandle) {
        let Some(body) = self.sim.registry.get(handle) else { return };
        let mesh = ctx.next_id();
        ctx.spawn(
            Entity::new(mesh)
                .with_tag(body.name.clone())
                .with_pos(body.position.as_vec3())
                .with_rotation(body.rotation().as_quat())
                .with_scale(Vec3::splat(body.scale as f32))
                .with_mesh(MeshComponent::sphere(body.radius as f32, body.color)),
        );

        let path = (body.kind == BodyKind::Planet).then(|| {
            let id = ctx.next_id();
            ctx.spawn(
                Entity::new(id).with_tag(format!("{} orbit", body.name)).with_mesh(
                    MeshComponent::new(
                        Shape::OrbitPath { a: body.orbit.a as f32, b: body.orbit.b as f32 },
                        bodies::ORBIT_PATH_COLOR,
                    )
                    .with_opacity(bodies::ORBIT_PATH_OPACITY),
                ),
            );
            id
        });

        if let Some(texture) = &body.texture {
            ctx.assets.request(AssetKind::Texture, texture.clone(), Some(handle.owner_token()));
        }

        if let Some(body) = self.sim.registry.get_mut(handle) {
            body.visuals.mesh = Some(mesh);
            body.visuals.path = path;
        }
    }

    /// Ring decoration, composed with the planet's transform.
    fn spawn_ring(&self, ctx: &mut EngineContext, handle: BodyHandle) {
        let Some(body) = self.sim.registry.get(handle) else { return };
        let Some(mesh) = body.visuals.mesh else { return };
        let r = body.radius as f32;
        let id = ctx.next_id();
        ctx.spawn_child(
            Entity::new(id).with_tag(format!("{} rings", body.name)).with_mesh(
                MeshComponent::new(
                    Shape::Ring { inner: r * bodies::RING_INNER, outer: r * bodies::RING_OUTER },
                    bodies::RING_COLOR,
                )
                .with_opacity(bodies::RING_OPACITY),
            ),
            mesh,
            LocalTransform::new().with_rotation(Quat::from_rotation_x(bodies::RING_TILT)),
        );
    }

    fn despawn_removal(&self, ctx: &mut EngineContext, removal: &Removal) {
        let removed = std::iter::once((removal.handle, &removal.body))
            .chain(removal.moons.iter().map(|(h, b)| (*h, b)));
        for (handle, body) in removed {
            let cancelled = ctx.assets.cancel_owner(handle.owner_token());
            if cancelled > 0 {
                log::debug!("cancelled {cancelled} load(s) for {}", body.name);
            }
            for id in [body.visuals.mesh, body.visuals.path].into_iter().flatten() {
                ctx.despawn(id);
            }
        }
        for instance in &removal.scripted {
            ctx.assets.cancel_owner(instance.model.owner_token());
            if let Some(id) = instance.entity {
                ctx.despawn(id);
            }
            log::info!("{} detached with its anchor", instance.model.name());
        }
    }

    // ── Sync ───────────────────────────────────────────────────────

    /// Mirror simulation state into entity transforms, the glow and the light.
    fn sync_visuals(&self, ctx: &mut EngineContext) {
        let reg = &self.sim.registry;
        for kind in [BodyKind::Planet, BodyKind::Moon, BodyKind::Comet] {
            for handle in reg.list_by_kind(kind) {
                let Some(body) = reg.get(handle) else { continue };
                if let Some(mesh) = body.visuals.mesh {
                    ctx.set_transform(
                        mesh,
                        body.position.as_vec3(),
                        body.rotation().as_quat(),
                        Vec3::splat(body.scale as f32),
                    );
                }
            }
        }
        for instance in reg.scripted_iter() {
            if let Some(id) = instance.entity {
                ctx.set_transform(
                    id,
                    instance.position.as_vec3(),
                    instance.rotation.as_quat(),
                    Vec3::splat(instance.tether.scale as f32),
                );
            }
        }

        if let Some(sun) = &self.sun {
            let tilt = self.sim.sun.tilt.as_vec3();
            let rotation = Quat::from_euler(glam::EulerRot::XYZ, tilt.x, tilt.y, tilt.z);
            ctx.set_transform(sun.mesh, Vec3::ZERO, rotation, Vec3::ONE);
            if let Some(mesh) = ctx.scene.get_mut(sun.glow).and_then(|e| e.mesh.as_mut()) {
                mesh.opacity = self.sim.sun.glow_opacity as f32;
            }
            if let Some(light) = ctx.lights.get_mut(sun.light) {
                light.intensity = self.sim.sun.intensity as f32 * LIGHT_PER_INTENSITY;
            }
        }
    }

    // ── Commands ───────────────────────────────────────────────────

    fn planet_target(&self, key: &str, operation: &'static str) -> SimResult<BodyHandle> {
        match editor::resolve(&self.sim.registry, key)? {
            Target::Body(h) if self.sim.registry.get(h).is_some_and(|b| b.kind == BodyKind::Planet) => Ok(h),
            Target::Sun => Err(SimError::UnsupportedTarget { target: "the Sun".into(), operation }),
            Target::Body(_) => Err(SimError::InvalidInput(format!("{operation} needs a planet"))),
        }
    }

    fn run_command(&mut self, ctx: &mut EngineContext, cmd: &Command) -> SimResult<()> {
        let warn = |ctx: &mut EngineContext, warning: Option<String>| {
            if let Some(w) = warning {
                log::warn!("{w}");
                ctx.notify(Notice::warning(w));
            }
        };

        match cmd.kind {
            CMD_SET_SIM_SPEED => {
                let warning = self.sim.set_sim_speed(cmd.arg(0));
                warn(ctx, warning);
            }
            CMD_ADD_PLANET => {
                let handle = self.sim.add_random_planet(&mut ctx.rng)?;
                self.spawn_body(ctx, handle);
                log::info!("added {}", self.sim.registry.get(handle).map_or("", |b| b.name.as_str()));
            }
            CMD_ADD_MOON => {
                let parent = self.planet_target(&cmd.target, "adding a moon")?;
                let handle = self.sim.add_moon(parent, &mut ctx.rng)?;
                self.spawn_body(ctx, handle);
            }
            CMD_ADD_COMET => {
                let handle = self.sim.add_comet(cmd.arg(0), cmd.arg(1), &mut ctx.rng)?;
                self.spawn_body(ctx, handle);
            }
            CMD_ADD_MODEL => {
                let model = ScriptedModel::parse(cmd.arg(0))
                    .ok_or_else(|| SimError::InvalidInput(format!("unknown model '{}'", cmd.arg(0))))?;
                self.sim.add_scripted(model)?;
                let path = self
                    .manifest
                    .model_path(model.asset_key())
                    .unwrap_or(model.default_path())
                    .to_string();
                ctx.assets.request(AssetKind::Model, path, Some(model.owner_token()));
                log::info!("added {}", model.name());
            }
            CMD_REMOVE => {
                let handle = match editor::resolve(&self.sim.registry, &cmd.target)? {
                    Target::Sun => {
                        return Err(SimError::UnsupportedTarget { target: "the Sun".into(), operation: "removal" })
                    }
                    Target::Body(h) => h,
                };
                let removal = self.sim.registry.remove(handle)?;
                self.despawn_removal(ctx, &removal);
                log::info!("removed {} ({} bodies)", removal.body.name, removal.bodies_removed());
            }
            CMD_SET_SPEED => {
                let applied = editor::set_orbit_speed(&mut self.sim, &cmd.target, cmd.arg(0))?;
                warn(ctx, applied.warning);
            }
            CMD_SET_SCALE => {
                let applied = editor::set_scale(&mut self.sim, &cmd.target, cmd.arg(0))?;
                warn(ctx, applied.warning);
            }
            CMD_SET_ROTATION => {
                editor::set_rotation(&mut self.sim, &cmd.target, [cmd.arg(0), cmd.arg(1), cmd.arg(2)])?;
            }
            CMD_SET_TEXTURE => {
                let (handle, path) = editor::check_texture(&self.sim, &cmd.target, cmd.arg(0))?;
                let id = ctx.assets.request(AssetKind::Texture, path.clone(), Some(handle.owner_token()));
                log::debug!("texture request {:?} for {}: {path}", id, cmd.target);
            }
            CMD_SET_INTENSITY => {
                let confirmed = cmd.arg(1) == CONFIRMED;
                match editor::set_intensity(&mut self.sim, cmd.arg(0), confirmed)? {
                    IntensityEdit::Applied(applied) => warn(ctx, applied.warning),
                    IntensityEdit::NeedsConfirmation(applied) => {
                        warn(ctx, applied.warning);
                        let replay = Command::new(CMD_SET_INTENSITY)
                            .with_target(cmd.target.clone())
                            .with_arg(applied.value.to_string())
                            .with_arg(CONFIRMED);
                        ctx.notify(Notice::confirm(
                            format!(
                                "An intensity of {} is above the recommended {}. Apply anyway?",
                                applied.value, self.sim.config.intensity_confirm_above
                            ),
                            replay,
                        ));
                    }
                }
            }
            CMD_TOGGLE_MUSIC => {
                let cue = self.music.toggle();
                ctx.emit_sound(cue);
            }
            other => log::warn!("unknown command kind {other}"),
        }
        Ok(())
    }

    // ── Assets ─────────────────────────────────────────────────────

    fn texture_loaded(&mut self, ctx: &mut EngineContext, request: &LoadRequest, outcome: Result<u32, String>) -> SimResult<()> {
        let handle = request
            .owner
            .and_then(BodyHandle::from_owner_token)
            .ok_or_else(|| SimError::NoSuchBody("texture owner".into()))?;
        let slot = outcome.map_err(|reason| SimError::AssetLoadError { path: request.path.clone(), reason })?;
        editor::apply_texture(&mut self.sim, handle, &request.path)?;
        let mesh = self.sim.registry.get(handle).and_then(|b| b.visuals.mesh);
        if let Some(mesh) = mesh.and_then(|id| ctx.scene.get_mut(id)).and_then(|e| e.mesh.as_mut()) {
            mesh.texture = Some(TextureSlot(slot));
        }
        log::debug!("texture {} -> slot {slot}", request.path);
        Ok(())
    }

    fn model_loaded(&mut self, ctx: &mut EngineContext, request: &LoadRequest, outcome: Result<u32, String>) -> SimResult<()> {
        let model = request
            .owner
            .and_then(ScriptedModel::from_owner_token)
            .ok_or_else(|| SimError::NoSuchBody("model owner".into()))?;
        let slot = match outcome {
            Ok(slot) => slot,
            Err(reason) => {
                // Without its model the instance is invisible; drop it so it can be re-added.
                self.sim.registry.remove_scripted(model);
                return Err(SimError::AssetLoadError { path: request.path.clone(), reason });
            }
        };
        let Some(instance) = self.sim.registry.scripted_mut(model) else {
            return Err(SimError::NoSuchBody(model.name().to_string()));
        };
        let id = ctx.next_id();
        ctx.spawn(
            Entity::new(id)
                .with_tag(model.name())
                .with_pos(instance.position.as_vec3())
                .with_rotation(instance.rotation.as_quat())
                .with_scale(Vec3::splat(instance.tether.scale as f32))
                .with_mesh(MeshComponent::new(Shape::Model { model: ModelSlot(slot) }, Color::WHITE)),
        );
        instance.entity = Some(id);
        Ok(())
    }

    fn report(ctx: &mut EngineContext, what: &str, result: SimResult<()>) {
        if let Err(e) = result {
            log::warn!("{what} failed: {e}");
            ctx.notify(Notice::error(e.to_string()));
        }
    }
}

impl Default for SolarSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SolarSystem {
    fn config(&self) -> GameConfig {
        GameConfig {
            max_instances: 512,
            max_events: 8,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        ctx.camera = Camera3D::new(CAMERA_START);
        ctx.camera.look_at(Vec3::ZERO);
        ctx.lights.set_ambient(AMBIENT[0], AMBIENT[1], AMBIENT[2]);

        self.spawn_sun(ctx);
        for (i, handle) in self.sim.registry.list_by_kind(BodyKind::Planet).into_iter().enumerate() {
            self.spawn_body(ctx, handle);
            if i == bodies::RINGED_PLANET {
                self.spawn_ring(ctx, handle);
            }
        }
        log::info!(
            "solar system: {} planets, {} entities",
            self.sim.registry.count(BodyKind::Planet),
            ctx.scene.len()
        );
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        for event in input.iter() {
            self.navigator.handle(event, &mut ctx.camera);
        }
        self.navigator.step(&mut ctx.camera);

        let dt = ctx.dt() as f64;
        self.sim.tick(dt);
        self.sync_visuals(ctx);

        if let Some(opacity) = self.banner.tick(dt) {
            // One banner event per frame: catch-up steps overwrite the earlier opacity.
            ctx.events.retain(|e| e.kind != EVENT_BANNER);
            ctx.emit_event(GameEvent { kind: EVENT_BANNER, a: opacity as f32, b: 0.0, c: 0.0 });
        }
    }

    fn command(&mut self, ctx: &mut EngineContext, command: &Command) {
        let result = self.run_command(ctx, command);
        if result.is_ok() {
            self.sync_visuals(ctx);
        }
        Self::report(ctx, &format!("command {}", command.kind), result);
    }

    fn asset_loaded(&mut self, ctx: &mut EngineContext, completion: LoadCompletion) {
        let LoadCompletion { request, outcome } = completion;
        let result = match request.kind {
            AssetKind::Texture => self.texture_loaded(ctx, &request, outcome),
            AssetKind::Model => self.model_loaded(ctx, &request, outcome),
        };
        // A body removed mid-load is not worth a notice.
        match result {
            Err(SimError::NoSuchBody(what)) => log::debug!("dropping load {}: {what} is gone", request.path),
            other => Self::report(ctx, &format!("loading {}", request.path), other),
        }
    }

    fn manifest_loaded(&mut self, _ctx: &mut EngineContext, manifest: &AssetManifest) {
        if let Some(settings) = manifest.settings.clone() {
            match SimConfig::from_value(settings) {
                Ok(config) => {
                    let problems = config.problems();
                    if problems.is_empty() {
                        self.navigator.apply_config(&config);
                        self.banner.retime(config.banner_duration, config.banner_fade);
                        self.sim.apply_config(config);
                        log::info!("applied settings from manifest");
                    } else {
                        log::warn!("ignoring manifest settings, bad fields: {}", problems.join(", "));
                    }
                }
                Err(e) => log::warn!("ignoring manifest settings: {e}"),
            }
        }
        self.manifest = manifest.clone();
    }

    fn snapshot(&self) -> serde_json::Value {
        let reg = &self.sim.registry;
        let mut objects = vec![json!({ "key": "sun", "label": "Sun", "kind": "sun" })];
        for kind in [BodyKind::Planet, BodyKind::Moon, BodyKind::Comet] {
            for (i, handle) in reg.list_by_kind(kind).into_iter().enumerate() {
                if let Some(body) = reg.get(handle) {
                    objects.push(json!({
                        "key": format!("{}-{i}", kind.key_prefix()),
                        "label": body.name,
                        "kind": kind,
                        "speed": body.orbit.speed,
                        "scale": body.scale,
                        "texture": body.texture,
                    }));
                }
            }
        }
        let models: Vec<_> = ScriptedModel::ALL
            .iter()
            .map(|m| json!({ "name": m.name(), "present": reg.scripted(*m).is_some() }))
            .collect();

        json!({
            "objects": objects,
            "models": models,
            "simSpeed": self.sim.sim_speed(),
            "sunIntensity": self.sim.sun.intensity,
            "musicPlaying": self.music.is_playing(),
            "pointerLocked": self.navigator.mode() == LookMode::Locked,
            "planets": reg.count(BodyKind::Planet),
            "maxPlanets": self.sim.config.max_planets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_engine::NoticeLevel;

    fn started() -> (SolarSystem, EngineContext) {
        let mut game = SolarSystem::new();
        let mut ctx = EngineContext::with_seed(1234);
        game.init(&mut ctx);
        ctx.transforms.propagate(&mut ctx.scene);
        (game, ctx)
    }

    fn cmd(kind: u32, target: &str, args: &[&str]) -> Command {
        args.iter().fold(Command::new(kind).with_target(target), |c, a| c.with_arg(*a))
    }

    fn errors(ctx: &mut EngineContext) -> Vec<String> {
        ctx.take_notices()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .map(|n| n.message)
            .collect()
    }

    #[test]
    fn init_spawns_sun_planets_paths_and_ring() {
        let (_, ctx) = started();
        // sun + glow + 8 planets + 8 paths + ring
        assert_eq!(ctx.scene.len(), 2 + 8 + 8 + 1);
        let mercury = ctx.scene.iter().find(|e| e.tag == "Mercury").unwrap();
        assert_eq!(mercury.pos, Vec3::new(3.0, 0.0, 0.0));
        // one texture request per planet
        assert_eq!(ctx.assets.in_flight_count(), 8);
        assert_eq!(ctx.lights.count(), 1);
    }

    #[test]
    fn ring_follows_its_planet() {
        let (mut game, mut ctx) = started();
        for _ in 0..30 {
            game.update(&mut ctx, &InputQueue::new());
            ctx.transforms.propagate(&mut ctx.scene);
        }
        let saturn = ctx.scene.iter().find(|e| e.tag == "Saturn").unwrap().pos;
        let ring = ctx.scene.iter().find(|e| e.tag == "Saturn rings").unwrap().pos;
        assert!((saturn - ring).length() < 1e-5);
        assert_ne!(saturn, Vec3::new(15.0, 0.0, 0.0));
    }

    #[test]
    fn eleventh_planet_reports_an_error() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_ADD_PLANET, "", &[]));
        game.command(&mut ctx, &cmd(CMD_ADD_PLANET, "", &[]));
        assert!(errors(&mut ctx).is_empty());
        game.command(&mut ctx, &cmd(CMD_ADD_PLANET, "", &[]));
        assert_eq!(errors(&mut ctx).len(), 1);
        assert_eq!(game.simulation().registry.count(BodyKind::Planet), 10);
    }

    #[test]
    fn removing_a_planet_despawns_everything_it_owned() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_ADD_MOON, "planet-5", &[]));
        game.command(&mut ctx, &cmd(CMD_ADD_MOON, "planet-5", &[]));
        let before = ctx.scene.len();
        let size = game.simulation().registry.len();

        game.command(&mut ctx, &cmd(CMD_REMOVE, "planet-5", &[]));
        assert!(errors(&mut ctx).is_empty());
        // planet + path + ring + 2 moons
        assert_eq!(ctx.scene.len(), before - 5);
        assert_eq!(game.simulation().registry.len(), size - 3);
        assert!(ctx.scene.iter().all(|e| !e.tag.starts_with("Saturn")));
    }

    #[test]
    fn late_texture_for_removed_planet_is_dropped() {
        let (mut game, mut ctx) = started();
        let outbox: serde_json::Value = serde_json::from_str(&ctx.assets.take_outbox_json()).unwrap();
        let mercury_request = outbox[0]["id"].as_u64().unwrap() as u32;

        game.command(&mut ctx, &cmd(CMD_REMOVE, "planet-0", &[]));
        assert!(ctx.assets.complete(RequestId(mercury_request), Ok(3)).is_none());
        assert_eq!(ctx.assets.in_flight_count(), 7);
    }

    #[test]
    fn texture_completion_sets_slot() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_SET_TEXTURE, "planet-2", &["textures/earth_night.jpg"]));
        let outbox: serde_json::Value = serde_json::from_str(&ctx.assets.take_outbox_json()).unwrap();
        let last = outbox.as_array().unwrap().last().unwrap();
        assert_eq!(last["path"], "textures/earth_night.jpg");
        let id = RequestId(last["id"].as_u64().unwrap() as u32);

        let completion = ctx.assets.complete(id, Ok(9)).unwrap();
        game.asset_loaded(&mut ctx, completion);
        let earth = ctx.scene.iter().find(|e| e.tag == "Earth").unwrap();
        assert_eq!(earth.mesh.unwrap().texture, Some(TextureSlot(9)));
        let handle = game.simulation().registry.planet_at(2).unwrap();
        assert_eq!(
            game.simulation().registry.get(handle).unwrap().texture.as_deref(),
            Some("textures/earth_night.jpg")
        );
    }

    #[test]
    fn failed_texture_reports_and_keeps_state() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_SET_TEXTURE, "planet-1", &["missing.jpg"]));
        let outbox: serde_json::Value = serde_json::from_str(&ctx.assets.take_outbox_json()).unwrap();
        let id = RequestId(outbox.as_array().unwrap().last().unwrap()["id"].as_u64().unwrap() as u32);

        let completion = ctx.assets.complete(id, Err("404".into())).unwrap();
        game.asset_loaded(&mut ctx, completion);
        let errs = errors(&mut ctx);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("missing.jpg"));
        let venus = game.simulation().registry.planet_at(1).unwrap();
        assert_eq!(
            game.simulation().registry.get(venus).unwrap().texture.as_deref(),
            Some("textures/venus.jpg")
        );
    }

    #[test]
    fn enterprise_twice_is_a_duplicate() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_ADD_MODEL, "", &["Enterprise"]));
        assert!(errors(&mut ctx).is_empty());
        game.command(&mut ctx, &cmd(CMD_ADD_MODEL, "", &["Enterprise"]));
        let errs = errors(&mut ctx);
        assert_eq!(errs, vec!["Enterprise is already in the scene".to_string()]);
        assert_eq!(game.simulation().registry.scripted_iter().count(), 1);
    }

    #[test]
    fn model_spawns_when_loaded() {
        let (mut game, mut ctx) = started();
        ctx.assets.take_outbox_json();
        game.command(&mut ctx, &cmd(CMD_ADD_MODEL, "", &["tardis"]));
        let outbox: serde_json::Value = serde_json::from_str(&ctx.assets.take_outbox_json()).unwrap();
        assert_eq!(outbox[0]["kind"], "model");
        let id = RequestId(outbox[0]["id"].as_u64().unwrap() as u32);

        let entities = ctx.scene.len();
        let completion = ctx.assets.complete(id, Ok(0)).unwrap();
        game.asset_loaded(&mut ctx, completion);
        assert_eq!(ctx.scene.len(), entities + 1);
        assert!(ctx.scene.iter().any(|e| e.tag == "TARDIS"));
    }

    #[test]
    fn clamps_warn_and_apply() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_SET_SPEED, "planet-0", &["5"]));
        game.command(&mut ctx, &cmd(CMD_SET_SCALE, "planet-0", &["0.01"]));
        let notices = ctx.take_notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Warning));

        let handle = game.simulation().registry.planet_at(0).unwrap();
        let mercury = game.simulation().registry.get(handle).unwrap();
        assert_eq!(mercury.orbit.speed, 2.0);
        assert_eq!(mercury.scale, 0.1);
    }

    #[test]
    fn high_intensity_round_trips_through_confirmation() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_SET_INTENSITY, "sun", &["130"]));
        let notices = ctx.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Confirm);
        assert_eq!(game.simulation().sun.intensity, 50.0);

        let replay = notices[0].confirm.clone().unwrap();
        game.command(&mut ctx, &replay);
        assert_eq!(game.simulation().sun.intensity, 130.0);
        assert!(ctx.take_notices().is_empty());
    }

    #[test]
    fn editing_without_selection_fails() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_SET_SCALE, "", &["2"]));
        assert_eq!(errors(&mut ctx), vec!["no object selected".to_string()]);
    }

    #[test]
    fn music_toggle_emits_cues() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_TOGGLE_MUSIC, "", &[]));
        assert_eq!(ctx.sounds, vec![crate::ambience::SOUND_MUSIC_PLAY]);
    }

    #[test]
    fn banner_events_stop_after_it_fades() {
        let (mut game, mut ctx) = started();
        ctx.set_dt(1.0);
        let mut seen = 0;
        for _ in 0..15 {
            ctx.clear_frame_data();
            game.update(&mut ctx, &InputQueue::new());
            seen += ctx.events.iter().filter(|e| e.kind == EVENT_BANNER).count();
        }
        assert_eq!(seen, 10);
    }

    #[test]
    fn catch_up_steps_send_one_banner_event() {
        let (mut game, mut ctx) = started();
        ctx.clear_frame_data();
        for _ in 0..10 {
            game.update(&mut ctx, &InputQueue::new());
        }
        let banner: Vec<_> = ctx.events.iter().filter(|e| e.kind == EVENT_BANNER).collect();
        assert_eq!(banner.len(), 1);
        let expected = (10.0 / 60.0) / 2.0;
        assert!((banner[0].a - expected).abs() < 1e-4);
    }

    #[test]
    fn manifest_banner_timing_is_used() {
        let (mut game, mut ctx) = started();
        let manifest =
            AssetManifest::from_json(r#"{ "settings": { "banner_duration": 4, "banner_fade": 1 } }"#).unwrap();
        game.manifest_loaded(&mut ctx, &manifest);
        ctx.set_dt(1.0);
        let mut seen = 0;
        for _ in 0..10 {
            ctx.clear_frame_data();
            game.update(&mut ctx, &InputQueue::new());
            seen += ctx.events.iter().filter(|e| e.kind == EVENT_BANNER).count();
        }
        assert_eq!(seen, 4);
    }

    #[test]
    fn manifest_with_unusable_eccentricity_is_ignored() {
        let (mut game, mut ctx) = started();
        let manifest = AssetManifest::from_json(
            r#"{ "settings": { "max_planets": 9, "comet_eccentricity": { "min": 1.2, "max": 1.8 } } }"#,
        )
        .unwrap();
        game.manifest_loaded(&mut ctx, &manifest);
        assert_eq!(game.simulation().config, SimConfig::default());
        game.command(&mut ctx, &cmd(CMD_ADD_COMET, "", &["#ffffff", "1"]));
        let comet = game.simulation().registry.at(BodyKind::Comet, 0).unwrap();
        let orbit = game.simulation().registry.get(comet).unwrap().orbit;
        assert!(orbit.b <= orbit.a);
    }

    #[test]
    fn snapshot_lists_selectable_objects() {
        let (mut game, mut ctx) = started();
        game.command(&mut ctx, &cmd(CMD_ADD_COMET, "", &["#ff0000", "clockwise"]));
        let snap = game.snapshot();
        let objects = snap["objects"].as_array().unwrap();
        assert_eq!(objects[0]["key"], "sun");
        assert_eq!(objects[1]["label"], "Mercury");
        assert_eq!(objects.last().unwrap()["key"], "comet-0");
        assert_eq!(snap["simSpeed"], 100.0);
    }

    #[test]
    fn manifest_settings_override_config() {
        let (mut game, mut ctx) = started();
        let manifest = AssetManifest::from_json(r#"{ "settings": { "max_planets": 9 } }"#).unwrap();
        game.manifest_loaded(&mut ctx, &manifest);
        game.command(&mut ctx, &cmd(CMD_ADD_PLANET, "", &[]));
        game.command(&mut ctx, &cmd(CMD_ADD_PLANET, "", &[]));
        assert_eq!(errors(&mut ctx).len(), 1);
        assert_eq!(game.simulation().registry.count(BodyKind::Planet), 9);
    }
}
