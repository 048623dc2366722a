//! Tunables for the simulation.
//!
//! Every field has a default; the host may override any subset through the
//! `settings` object of the asset manifest.

use serde::Deserialize;

/// Closed interval used for clamping user input and for random draws.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamp `value`; the flag is true when it was out of range.
    pub fn clamp(&self, value: f64) -> (f64, bool) {
        let clamped = value.clamp(self.min, self.max);
        (clamped, clamped != value)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub max_planets: usize,
    pub max_moons_per_planet: usize,

    /// Degrees of orbital progression per second.
    pub sim_speed_default: f64,
    pub sim_speed: Bounds,

    // Editor clamps
    pub orbit_speed: Bounds,
    pub scale: Bounds,
    pub intensity: Bounds,
    /// Intensities above this need confirmation.
    pub intensity_confirm_above: f64,
    pub sun_intensity_default: f64,
    /// Glow-shell opacity at the default intensity.
    pub sun_glow_base: f64,

    // Navigator
    pub move_speed: f64,
    pub sprint_speed: f64,
    /// Radians of yaw/pitch per pixel of mouse movement.
    pub mouse_sensitivity: f64,

    /// b = a * ratio for planets.
    pub semi_minor_ratio: f64,

    // Random ranges for added bodies
    pub planet_radius: Bounds,
    pub planet_distance: Bounds,
    pub planet_speed: Bounds,
    pub planet_spin: Bounds,
    pub moon_radius: Bounds,
    /// Added to the parent's radius to get the moon's orbit radius.
    pub moon_gap: Bounds,
    pub moon_speed: Bounds,
    pub comet_distance: Bounds,
    pub comet_eccentricity: Bounds,
    pub comet_inclination: Bounds,
    pub comet_speed: Bounds,

    // Credit banner (seconds)
    pub banner_duration: f64,
    pub banner_fade: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_planets: 10,
            max_moons_per_planet: 3,
            sim_speed_default: 100.0,
            sim_speed: Bounds::new(0.1, 10_000.0),
            orbit_speed: Bounds::new(0.001, 2.0),
            scale: Bounds::new(0.1, 5.0),
            intensity: Bounds::new(0.0, 150.0),
            intensity_confirm_above: 100.0,
            sun_intensity_default: 50.0,
            sun_glow_base: 0.4,
            move_speed: 0.1,
            sprint_speed: 0.5,
            mouse_sensitivity: 0.002,
            semi_minor_ratio: 0.8,
            planet_radius: Bounds::new(0.2, 1.2),
            planet_distance: Bounds::new(24.0, 40.0),
            planet_speed: Bounds::new(0.001, 0.02),
            planet_spin: Bounds::new(0.2, 1.0),
            moon_radius: Bounds::new(0.05, 0.2),
            moon_gap: Bounds::new(0.5, 1.5),
            moon_speed: Bounds::new(0.01, 0.05),
            comet_distance: Bounds::new(10.0, 30.0),
            comet_eccentricity: Bounds::new(0.3, 0.7),
            comet_inclination: Bounds::new(0.0, std::f64::consts::FRAC_PI_6),
            comet_speed: Bounds::new(0.002, 0.01),
            banner_duration: 10.0,
            banner_fade: 2.0,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Names of fields whose values cannot be used: inverted or non-finite
    /// ranges, negative sizes or distances, comet eccentricity outside [0, 1],
    /// semi-minor ratio outside (0, 1], a confirmation threshold outside the
    /// intensity range, a banner shorter than its fades.
    pub fn problems(&self) -> Vec<&'static str> {
        let ranges = [
            ("sim_speed", self.sim_speed),
            ("orbit_speed", self.orbit_speed),
            ("scale", self.scale),
            ("intensity", self.intensity),
            ("planet_radius", self.planet_radius),
            ("planet_distance", self.planet_distance),
            ("planet_speed", self.planet_speed),
            ("planet_spin", self.planet_spin),
            ("moon_radius", self.moon_radius),
            ("moon_gap", self.moon_gap),
            ("moon_speed", self.moon_speed),
            ("comet_distance", self.comet_distance),
            ("comet_eccentricity", self.comet_eccentricity),
            ("comet_inclination", self.comet_inclination),
            ("comet_speed", self.comet_speed),
        ];
        let mut problems: Vec<&'static str> = ranges
            .iter()
            .filter(|(_, b)| !b.is_valid())
            .map(|(name, _)| *name)
            .collect();
        let lengths = [
            ("planet_radius", self.planet_radius),
            ("planet_distance", self.planet_distance),
            ("moon_radius", self.moon_radius),
            ("moon_gap", self.moon_gap),
            ("comet_distance", self.comet_distance),
            ("intensity", self.intensity),
        ];
        problems.extend(
            lengths
                .iter()
                .filter(|(_, b)| b.is_valid() && b.min < 0.0)
                .map(|(name, _)| *name),
        );
        // b = a * e must not exceed a.
        let e = self.comet_eccentricity;
        if e.is_valid() && (e.min < 0.0 || e.max > 1.0) {
            problems.push("comet_eccentricity");
        }
        if !self.intensity.contains(self.intensity_confirm_above) {
            problems.push("intensity_confirm_above");
        }
        if !(self.semi_minor_ratio > 0.0 && self.semi_minor_ratio <= 1.0) {
            problems.push("semi_minor_ratio");
        }
        if !self.sim_speed.contains(self.sim_speed_default) {
            problems.push("sim_speed_default");
        }
        if !(self.banner_fade >= 0.0 && self.banner_duration >= 2.0 * self.banner_fade) {
            problems.push("banner_duration");
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let config = SimConfig::default();
        assert!(config.problems().is_empty());
        assert_eq!(config.max_planets, 10);
        assert_eq!(config.max_moons_per_planet, 3);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = SimConfig::from_json(r#"{ "max_planets": 12, "scale": { "min": 0.5, "max": 3 } }"#).unwrap();
        assert_eq!(config.max_planets, 12);
        assert_eq!(config.scale, Bounds::new(0.5, 3.0));
        assert_eq!(config.sim_speed_default, 100.0);
    }

    #[test]
    fn clamp_reports_out_of_range() {
        let b = Bounds::new(0.001, 2.0);
        assert_eq!(b.clamp(5.0), (2.0, true));
        assert_eq!(b.clamp(1.0), (1.0, false));
    }

    #[test]
    fn inverted_range_is_a_problem() {
        let config = SimConfig { scale: Bounds::new(5.0, 0.1), ..SimConfig::default() };
        assert_eq!(config.problems(), vec!["scale"]);
    }

    #[test]
    fn comet_eccentricity_above_one_is_a_problem() {
        let config = SimConfig::from_json(r#"{ "comet_eccentricity": { "min": 1.2, "max": 1.5 } }"#).unwrap();
        assert_eq!(config.problems(), vec!["comet_eccentricity"]);
    }

    #[test]
    fn negative_lengths_are_problems() {
        let config = SimConfig::from_json(
            r#"{ "moon_gap": { "min": -5, "max": -4 }, "planet_distance": { "min": -1, "max": 40 } }"#,
        )
        .unwrap();
        assert_eq!(config.problems(), vec!["planet_distance", "moon_gap"]);
    }

    #[test]
    fn confirm_threshold_must_lie_in_intensity_range() {
        let config = SimConfig { intensity_confirm_above: 200.0, ..SimConfig::default() };
        assert_eq!(config.problems(), vec!["intensity_confirm_above"]);
    }
}
