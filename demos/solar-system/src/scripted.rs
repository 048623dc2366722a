//! Decorative single-instance models that orbit a planet.

use glam::{DQuat, DVec3};
use orrery_engine::{EntityId, OwnerToken};

use crate::registry::BodyHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptedModel {
    Enterprise,
    MillenniumFalcon,
    Tardis,
}

/// Fixed orbit of a scripted model around its anchor planet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tether {
    /// Name of the planet this model always orbits.
    pub anchor: &'static str,
    pub radius: f64,
    /// Radians per tick.
    pub speed: f64,
    pub inclination: f64,
    /// Uniform scale of the loaded model.
    pub scale: f64,
}

impl ScriptedModel {
    pub const ALL: [ScriptedModel; 3] = [
        ScriptedModel::Enterprise,
        ScriptedModel::MillenniumFalcon,
        ScriptedModel::Tardis,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScriptedModel::Enterprise => "Enterprise",
            ScriptedModel::MillenniumFalcon => "Millennium Falcon",
            ScriptedModel::Tardis => "TARDIS",
        }
    }

    /// Key into the manifest's `models` table.
    pub fn asset_key(self) -> &'static str {
        match self {
            ScriptedModel::Enterprise => "enterprise",
            ScriptedModel::MillenniumFalcon => "millennium-falcon",
            ScriptedModel::Tardis => "tardis",
        }
    }

    /// Path used when the manifest has no entry for this model.
    pub fn default_path(self) -> &'static str {
        match self {
            ScriptedModel::Enterprise => "models/enterprise.glb",
            ScriptedModel::MillenniumFalcon => "models/millennium_falcon.glb",
            ScriptedModel::Tardis => "models/tardis.glb",
        }
    }

    pub fn tether(self) -> Tether {
        match self {
            ScriptedModel::Enterprise => Tether { anchor: "Earth", radius: 1.5, speed: 0.02, inclination: 0.3, scale: 0.05 },
            ScriptedModel::MillenniumFalcon => Tether { anchor: "Mars", radius: 1.2, speed: 0.03, inclination: 0.6, scale: 0.04 },
            ScriptedModel::Tardis => Tether { anchor: "Jupiter", radius: 2.5, speed: 0.015, inclination: 1.0, scale: 0.1 },
        }
    }

    /// Case-insensitive lookup by display name or asset key.
    pub fn parse(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL.into_iter().find(|m| {
            m.name().eq_ignore_ascii_case(wanted) || m.asset_key().eq_ignore_ascii_case(wanted)
        })
    }

    /// Cancellation token for this model's pending load.
    pub fn owner_token(self) -> OwnerToken {
        OwnerToken(self as u64)
    }

    pub fn from_owner_token(token: OwnerToken) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.owner_token() == token)
    }
}

/// The live instance of a scripted model.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedInstance {
    pub model: ScriptedModel,
    pub anchor: BodyHandle,
    pub tether: Tether,
    pub theta: f64,
    pub position: DVec3,
    pub rotation: DQuat,
    /// Spawned once the model file has loaded.
    pub entity: Option<EntityId>,
}

impl ScriptedInstance {
    pub fn new(model: ScriptedModel, anchor: BodyHandle) -> Self {
        Self {
            model,
            anchor,
            tether: model.tether(),
            theta: 0.0,
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            entity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_names_and_keys() {
        assert_eq!(ScriptedModel::parse("enterprise"), Some(ScriptedModel::Enterprise));
        assert_eq!(ScriptedModel::parse(" Millennium Falcon "), Some(ScriptedModel::MillenniumFalcon));
        assert_eq!(ScriptedModel::parse("millennium-falcon"), Some(ScriptedModel::MillenniumFalcon));
        assert_eq!(ScriptedModel::parse("tardis"), Some(ScriptedModel::Tardis));
        assert_eq!(ScriptedModel::parse("death star"), None);
    }

    #[test]
    fn owner_tokens_round_trip() {
        for model in ScriptedModel::ALL {
            assert_eq!(ScriptedModel::from_owner_token(model.owner_token()), Some(model));
        }
    }
}
