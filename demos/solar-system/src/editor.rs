//! Validated setters behind the parameter panel.
//!
//! Every setter resolves its target, parses and clamps the input, and only
//! then mutates. An `Err` always means nothing changed.

use glam::DVec3;

use crate::error::{SimError, SimResult};
use crate::registry::{BodyHandle, BodyKind, Registry};
use crate::sim::Simulation;

/// A parsed selection key: `sun`, `planet-{i}`, `moon-{i}` or `comet-{i}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Sun,
    Body { kind: BodyKind, index: usize },
}

impl Selection {
    pub fn parse(key: &str) -> SimResult<Self> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SimError::NoSelection);
        }
        if key.eq_ignore_ascii_case("sun") {
            return Ok(Selection::Sun);
        }
        let invalid = || SimError::InvalidInput(format!("unknown selection '{key}'"));
        let (prefix, index) = key.rsplit_once('-').ok_or_else(invalid)?;
        let index: usize = index.parse().map_err(|_| invalid())?;
        let kind = [BodyKind::Planet, BodyKind::Moon, BodyKind::Comet]
            .into_iter()
            .find(|k| k.key_prefix() == prefix)
            .ok_or_else(invalid)?;
        Ok(Selection::Body { kind, index })
    }

    pub fn key(&self) -> String {
        match self {
            Selection::Sun => "sun".to_string(),
            Selection::Body { kind, index } => format!("{}-{index}", kind.key_prefix()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Sun,
    Body(BodyHandle),
}

/// Resolve a selection key against the live registry.
pub fn resolve(registry: &Registry, key: &str) -> SimResult<Target> {
    match Selection::parse(key)? {
        Selection::Sun => Ok(Target::Sun),
        Selection::Body { kind, index } => registry
            .at(kind, index)
            .map(Target::Body)
            .ok_or_else(|| SimError::NoSuchBody(format!("{kind:?} {index}").to_lowercase())),
    }
}

/// Resolve to a body, rejecting the Sun for `operation`.
fn resolve_body(registry: &Registry, key: &str, operation: &'static str) -> SimResult<BodyHandle> {
    match resolve(registry, key)? {
        Target::Sun => Err(SimError::UnsupportedTarget { target: "the Sun".into(), operation }),
        Target::Body(handle) => Ok(handle),
    }
}

fn parse_number(text: &str, field: &str) -> SimResult<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SimError::InvalidInput(format!("{field} must be a number, got '{}'", text.trim())))
}

/// Value actually stored by a setter, plus the clamp warning if the input was out of range.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub value: f64,
    pub warning: Option<String>,
}

fn clamp_with_warning(value: f64, bounds: crate::config::Bounds, field: &str) -> Applied {
    let (clamped, out_of_range) = bounds.clamp(value);
    Applied {
        value: clamped,
        warning: out_of_range.then(|| {
            format!("{field} must be between {} and {}; using {clamped}", bounds.min, bounds.max)
        }),
    }
}

pub fn set_orbit_speed(sim: &mut Simulation, key: &str, text: &str) -> SimResult<Applied> {
    let handle = resolve_body(&sim.registry, key, "orbital speed")?;
    let applied = clamp_with_warning(parse_number(text, "speed")?, sim.config.orbit_speed, "speed");
    let body = sim.registry.get_mut(handle).ok_or_else(|| SimError::NoSuchBody(key.into()))?;
    body.orbit.speed = applied.value;
    Ok(applied)
}

pub fn set_scale(sim: &mut Simulation, key: &str, text: &str) -> SimResult<Applied> {
    let handle = resolve_body(&sim.registry, key, "scale")?;
    let applied = clamp_with_warning(parse_number(text, "scale")?, sim.config.scale, "scale");
    let body = sim.registry.get_mut(handle).ok_or_else(|| SimError::NoSuchBody(key.into()))?;
    body.scale = applied.value;
    Ok(applied)
}

/// Absolute rotation in radians. Unparsable fields count as 0. Resets a
/// body's accumulated spin.
pub fn set_rotation(sim: &mut Simulation, key: &str, fields: [&str; 3]) -> SimResult<(Target, DVec3)> {
    let target = resolve(&sim.registry, key)?;
    let [x, y, z] = fields.map(|f| f.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0));
    let tilt = DVec3::new(x, y, z);
    match target {
        Target::Sun => sim.sun.tilt = tilt,
        Target::Body(handle) => {
            let body = sim.registry.get_mut(handle).ok_or_else(|| SimError::NoSuchBody(key.into()))?;
            body.tilt = tilt;
            body.spin.angle = 0.0;
        }
    }
    Ok((target, tilt))
}

/// Validate a texture change. The caller issues the load; nothing is mutated
/// until `apply_texture`.
pub fn check_texture(sim: &Simulation, key: &str, path: &str) -> SimResult<(BodyHandle, String)> {
    let handle = resolve_body(&sim.registry, key, "textures")?;
    let path = path.trim();
    if path.is_empty() {
        return Err(SimError::InvalidInput("texture path is empty".into()));
    }
    Ok((handle, path.to_string()))
}

/// Record a texture that finished loading. Fails if the body is gone.
pub fn apply_texture(sim: &mut Simulation, handle: BodyHandle, path: &str) -> SimResult<()> {
    let body = sim
        .registry
        .get_mut(handle)
        .ok_or_else(|| SimError::NoSuchBody("texture owner".into()))?;
    body.texture = Some(path.to_string());
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntensityEdit {
    Applied(Applied),
    /// Above the confirmation threshold; nothing changed yet.
    NeedsConfirmation(Applied),
}

/// Set the sun's light intensity. Values above the threshold are only
/// applied with `confirmed`.
pub fn set_intensity(sim: &mut Simulation, text: &str, confirmed: bool) -> SimResult<IntensityEdit> {
    let c = &sim.config;
    let applied = clamp_with_warning(parse_number(text, "intensity")?, c.intensity, "intensity");
    if applied.value > c.intensity_confirm_above && !confirmed {
        return Ok(IntensityEdit::NeedsConfirmation(applied));
    }
    let glow = if c.sun_intensity_default > 0.0 {
        (c.sun_glow_base * applied.value / c.sun_intensity_default).min(1.0)
    } else {
        c.sun_glow_base
    };
    sim.sun.intensity = applied.value;
    sim.sun.glow_opacity = glow;
    Ok(IntensityEdit::Applied(applied))
}
