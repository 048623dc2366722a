//! Body registry: a generational slot map of planets, moons and comets.
//!
//! Handles stay valid until their body is removed and never alias a later
//! body, so moons and scripted models can refer to their planet across
//! removals of other planets. Per-kind lists keep insertion order, which is
//! the display index used by selection keys.

use glam::{DQuat, DVec3};
use orrery_engine::{Color, EntityId, OwnerToken};
use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::scripted::{ScriptedInstance, ScriptedModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

/// Tag bit keeping body tokens apart from scripted-model tokens.
const BODY_TOKEN_TAG: u64 = 1 << 63;

impl BodyHandle {
    /// Cancellation token for loads owned by this body.
    pub fn owner_token(self) -> OwnerToken {
        OwnerToken(BODY_TOKEN_TAG | (self.index as u64) << 32 | self.generation as u64)
    }

    pub fn from_owner_token(token: OwnerToken) -> Option<Self> {
        if token.0 & BODY_TOKEN_TAG == 0 {
            return None;
        }
        let bits = token.0 & !BODY_TOKEN_TAG;
        Some(Self {
            index: (bits >> 32) as u32,
            generation: bits as u32,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Planet,
    Moon,
    Comet,
}

impl BodyKind {
    pub fn key_prefix(self) -> &'static str {
        match self {
            BodyKind::Planet => "planet",
            BodyKind::Moon => "moon",
            BodyKind::Comet => "comet",
        }
    }
}

/// Orbital state. Which fields matter depends on the kind: planets use a/b,
/// moons use `a` as the circle radius, comets use all of them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    pub a: f64,
    pub b: f64,
    /// Planets: multiplier on the simulation speed. Moons and comets: radians per tick.
    pub speed: f64,
    pub angle: f64,
    pub inclination: f64,
    /// +1 counter-clockwise, -1 clockwise.
    pub direction: f64,
}

impl Orbit {
    pub fn ellipse(a: f64, b: f64, speed: f64) -> Self {
        Self { a, b, speed, angle: 0.0, inclination: 0.0, direction: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spin {
    pub rate: f64,
    pub angle: f64,
}

/// Scene entities owned by a body. Decorations hang off `mesh` in the
/// transform graph, so despawning `mesh` takes them too.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Visuals {
    pub mesh: Option<EntityId>,
    pub path: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub kind: BodyKind,
    pub name: String,
    pub orbit: Orbit,
    pub spin: Spin,
    /// Absolute tilt in radians, set by the editor.
    pub tilt: DVec3,
    pub scale: f64,
    pub radius: f64,
    pub color: Color,
    pub texture: Option<String>,
    /// Planet a moon circles.
    pub parent: Option<BodyHandle>,
    pub position: DVec3,
    pub visuals: Visuals,
}

impl Body {
    pub fn new(kind: BodyKind, name: impl Into<String>, radius: f64, orbit: Orbit) -> Self {
        Self {
            kind,
            name: name.into(),
            orbit,
            spin: Spin::default(),
            tilt: DVec3::ZERO,
            scale: 1.0,
            radius,
            color: Color::WHITE,
            texture: None,
            parent: None,
            position: DVec3::ZERO,
            visuals: Visuals::default(),
        }
    }

    pub fn with_spin(mut self, rate: f64) -> Self {
        self.spin.rate = rate;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn with_parent(mut self, parent: BodyHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Orientation of the body's mesh: tilt plus accumulated spin.
    pub fn rotation(&self) -> DQuat {
        crate::orbit::body_rotation(self.tilt, self.spin.angle)
    }
}

/// Everything a `remove` took out, so the caller can despawn visuals and
/// cancel pending loads.
#[derive(Debug, Clone)]
pub struct Removal {
    pub handle: BodyHandle,
    pub body: Body,
    pub moons: Vec<(BodyHandle, Body)>,
    pub scripted: Vec<ScriptedInstance>,
}

impl Removal {
    /// Number of registry bodies removed (the target plus its moons).
    pub fn bodies_removed(&self) -> usize {
        1 + self.moons.len()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<Body>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    planets: Vec<BodyHandle>,
    moons: Vec<BodyHandle>,
    comets: Vec<BodyHandle>,
    scripted: Vec<ScriptedInstance>,
    max_planets: usize,
    max_moons_per_planet: usize,
}

impl Registry {
    pub fn new(max_planets: usize, max_moons_per_planet: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            planets: Vec::new(),
            moons: Vec::new(),
            comets: Vec::new(),
            scripted: Vec::new(),
            max_planets,
            max_moons_per_planet,
        }
    }

    /// Change the caps. Bodies already over a lowered cap stay.
    pub fn set_limits(&mut self, max_planets: usize, max_moons_per_planet: usize) {
        self.max_planets = max_planets;
        self.max_moons_per_planet = max_moons_per_planet;
    }

    /// Insert a body. Moons must name a live planet as parent.
    pub fn add(&mut self, body: Body) -> SimResult<BodyHandle> {
        match body.kind {
            BodyKind::Planet => {
                if self.planets.len() >= self.max_planets {
                    return Err(SimError::CapacityExceeded { what: "planets", limit: self.max_planets });
                }
            }
            BodyKind::Moon => {
                let parent = body
                    .parent
                    .filter(|&p| self.get(p).is_some_and(|b| b.kind == BodyKind::Planet))
                    .ok_or_else(|| SimError::NoSuchBody(format!("parent planet of {}", body.name)))?;
                if self.moons_of(parent).len() >= self.max_moons_per_planet {
                    return Err(SimError::CapacityExceeded {
                        what: "moons for this planet",
                        limit: self.max_moons_per_planet,
                    });
                }
            }
            BodyKind::Comet => {}
        }

        let kind = body.kind;
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.body = Some(body);
                BodyHandle { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, body: Some(body) });
                BodyHandle { index, generation: 0 }
            }
        };
        self.list_mut(kind).push(handle);
        Ok(handle)
    }

    /// Remove a body. A planet takes its moons and anchored scripted models with it.
    pub fn remove(&mut self, handle: BodyHandle) -> SimResult<Removal> {
        let body = self.take(handle).ok_or_else(|| SimError::NoSuchBody("selected object".into()))?;

        let mut moons = Vec::new();
        let mut scripted = Vec::new();
        if body.kind == BodyKind::Planet {
            for moon in self.moons_of(handle) {
                if let Some(m) = self.take(moon) {
                    moons.push((moon, m));
                }
            }
            let (gone, kept): (Vec<_>, Vec<_>) =
                std::mem::take(&mut self.scripted).into_iter().partition(|s| s.anchor == handle);
            self.scripted = kept;
            scripted = gone;
        }

        Ok(Removal { handle, body, moons, scripted })
    }

    fn take(&mut self, handle: BodyHandle) -> Option<Body> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.list_mut(body.kind).retain(|&h| h != handle);
        Some(body)
    }

    fn list(&self, kind: BodyKind) -> &Vec<BodyHandle> {
        match kind {
            BodyKind::Planet => &self.planets,
            BodyKind::Moon => &self.moons,
            BodyKind::Comet => &self.comets,
        }
    }

    fn list_mut(&mut self, kind: BodyKind) -> &mut Vec<BodyHandle> {
        match kind {
            BodyKind::Planet => &mut self.planets,
            BodyKind::Moon => &mut self.moons,
            BodyKind::Comet => &mut self.comets,
        }
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_ref())
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.body.as_mut())
    }

    pub fn is_live(&self, handle: BodyHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Handles of one kind in display order.
    pub fn list_by_kind(&self, kind: BodyKind) -> Vec<BodyHandle> {
        self.list(kind).clone()
    }

    /// Body of `kind` at display index `i`.
    pub fn at(&self, kind: BodyKind, i: usize) -> Option<BodyHandle> {
        self.list(kind).get(i).copied()
    }

    pub fn planet_at(&self, i: usize) -> Option<BodyHandle> {
        self.at(BodyKind::Planet, i)
    }

    /// Moons of `parent` in insertion order.
    pub fn moons_of(&self, parent: BodyHandle) -> Vec<BodyHandle> {
        self.moons
            .iter()
            .copied()
            .filter(|&m| self.get(m).is_some_and(|b| b.parent == Some(parent)))
            .collect()
    }

    /// Number of orbiting bodies (scripted models are not counted).
    pub fn len(&self) -> usize {
        self.planets.len() + self.moons.len() + self.comets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: BodyKind) -> usize {
        self.list(kind).len()
    }

    // ── Scripted models ─────────────────────────────────────────────

    /// Register a scripted model. At most one instance per model; the anchor
    /// must be a live planet.
    pub fn add_scripted(&mut self, instance: ScriptedInstance) -> SimResult<()> {
        if self.scripted(instance.model).is_some() {
            return Err(SimError::DuplicateSingleton(instance.model.name().to_string()));
        }
        if !self.get(instance.anchor).is_some_and(|b| b.kind == BodyKind::Planet) {
            return Err(SimError::NoSuchBody(format!("anchor planet of {}", instance.model.name())));
        }
        self.scripted.push(instance);
        Ok(())
    }

    pub fn scripted(&self, model: ScriptedModel) -> Option<&ScriptedInstance> {
        self.scripted.iter().find(|s| s.model == model)
    }

    pub fn scripted_mut(&mut self, model: ScriptedModel) -> Option<&mut ScriptedInstance> {
        self.scripted.iter_mut().find(|s| s.model == model)
    }

    pub fn scripted_iter(&self) -> impl Iterator<Item = &ScriptedInstance> {
        self.scripted.iter()
    }

    pub fn scripted_iter_mut(&mut self) -> impl Iterator<Item = &mut ScriptedInstance> {
        self.scripted.iter_mut()
    }

    pub fn remove_scripted(&mut self, model: ScriptedModel) -> Option<ScriptedInstance> {
        let index = self.scripted.iter().position(|s| s.model == model)?;
        Some(self.scripted.remove(index))
    }
}
