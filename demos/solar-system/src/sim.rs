//! Simulation state and the per-tick integrators.
//!
//! `Simulation` owns everything that evolves: the body registry, the sun and
//! the simulation speed. It knows nothing about the engine scene; game.rs
//! mirrors its state into entities after each tick.

use glam::DVec3;
use orrery_engine::{Color, Rng};

use crate::bodies;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::orbit;
use crate::registry::{Body, BodyHandle, BodyKind, Orbit, Registry};
use crate::scripted::{ScriptedInstance, ScriptedModel};

/// The sun is a singleton, not a registry body.
#[derive(Debug, Clone, PartialEq)]
pub struct SunState {
    pub intensity: f64,
    pub glow_opacity: f64,
    pub tilt: DVec3,
}

impl SunState {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            intensity: config.sun_intensity_default,
            glow_opacity: config.sun_glow_base,
            tilt: DVec3::ZERO,
        }
    }
}

/// Direction of a comet's travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub fn parse(text: &str) -> SimResult<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "counterclockwise" | "1" => Ok(Direction::CounterClockwise),
            "clockwise" | "-1" => Ok(Direction::Clockwise),
            other => Err(SimError::InvalidInput(format!("unknown direction '{other}'"))),
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            Direction::CounterClockwise => 1.0,
            Direction::Clockwise => -1.0,
        }
    }
}

/// Parse `#rrggbb`.
pub fn parse_hex_color(text: &str) -> SimResult<Color> {
    let invalid = || SimError::InvalidInput(format!("'{text}' is not a #rrggbb color"));
    let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 {
        return Err(invalid());
    }
    u32::from_str_radix(hex, 16).map(Color::from_hex).map_err(|_| invalid())
}

const COMET_RADIUS: f64 = 0.15;

pub struct Simulation {
    pub config: SimConfig,
    pub registry: Registry,
    pub sun: SunState,
    sim_speed: f64,
    /// Counter for "Planet N" names.
    planets_added: u32,
    comets_added: u32,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        Self {
            registry: Registry::new(config.max_planets, config.max_moons_per_planet),
            sun: SunState::new(&config),
            sim_speed: config.sim_speed_default,
            planets_added: 0,
            comets_added: 0,
            config,
        }
    }

    /// A simulation holding the eight initial planets at angle 0.
    pub fn populated(config: SimConfig) -> Self {
        let mut sim = Self::new(config);
        for seed in &bodies::PLANETS {
            let a = seed.distance;
            let body = Body::new(
                BodyKind::Planet,
                seed.name,
                seed.radius,
                Orbit::ellipse(a, a * sim.config.semi_minor_ratio, seed.speed),
            )
            .with_spin(bodies::PLANET_SPIN_RATE)
            .with_color(Color::from_hex(seed.color))
            .with_texture(seed.texture)
            .with_position(orbit::ellipse_point(a, a * sim.config.semi_minor_ratio, 0.0));
            if let Err(e) = sim.registry.add(body) {
                log::warn!("initial planet {} rejected: {e}", seed.name);
            }
        }
        sim
    }

    /// Replace the tunables. Caps apply to future additions only.
    pub fn apply_config(&mut self, config: SimConfig) {
        self.registry.set_limits(config.max_planets, config.max_moons_per_planet);
        self.sim_speed = self.sim_speed.clamp(config.sim_speed.min, config.sim_speed.max);
        self.config = config;
    }

    pub fn sim_speed(&self) -> f64 {
        self.sim_speed
    }

    /// Set the simulation speed from user text. Unparsable text falls back to
    /// the default; out-of-range values are clamped. Returns the warning to
    /// show, if any.
    pub fn set_sim_speed(&mut self, text: &str) -> Option<String> {
        let bounds = self.config.sim_speed;
        match text.trim().parse::<f64>().ok().filter(|v| v.is_finite()) {
            None => {
                self.sim_speed = self.config.sim_speed_default;
                Some(format!("'{}' is not a number; simulation speed reset to {}", text.trim(), self.sim_speed))
            }
            Some(value) => {
                let (speed, clamped) = bounds.clamp(value);
                self.sim_speed = speed;
                clamped.then(|| format!("simulation speed must be between {} and {}; using {speed}", bounds.min, bounds.max))
            }
        }
    }

    /// Advance every body by one tick of `dt` seconds.
    ///
    /// Planets scale with `dt` and the simulation speed; moons, comets and
    /// scripted models advance by a fixed increment per tick. Planets move
    /// first so satellites read their parent's updated position.
    pub fn tick(&mut self, dt: f64) {
        let w = orbit::angular_speed(self.sim_speed);
        let reg = &mut self.registry;

        for h in reg.list_by_kind(BodyKind::Planet) {
            if let Some(body) = reg.get_mut(h) {
                body.orbit.angle += body.orbit.speed * w * dt;
                body.spin.angle += body.spin.rate * w * dt;
                body.position = orbit::ellipse_point(body.orbit.a, body.orbit.b, body.orbit.angle);
            }
        }

        for h in reg.list_by_kind(BodyKind::Moon) {
            let Some(center) = reg.get(h).and_then(|m| m.parent).and_then(|p| reg.get(p)).map(|p| p.position) else {
                continue;
            };
            if let Some(moon) = reg.get_mut(h) {
                moon.orbit.angle += moon.orbit.speed;
                moon.spin.angle += moon.spin.rate * dt;
                moon.position = orbit::circle_point(center, moon.orbit.a, moon.orbit.angle);
            }
        }

        let anchors: Vec<Option<DVec3>> = reg
            .scripted_iter()
            .map(|s| reg.get(s.anchor).map(|b| b.position))
            .collect();
        for (instance, anchor) in reg.scripted_iter_mut().zip(anchors) {
            let Some(anchor) = anchor else { continue };
            let t = instance.tether;
            instance.theta += t.speed;
            instance.position = orbit::tethered_point(anchor, t.radius, t.inclination, instance.theta);
            let ahead = orbit::tethered_point(anchor, t.radius, t.inclination, instance.theta + orbit::LOOK_AHEAD);
            instance.rotation = orbit::look_at_rotation(instance.position, ahead);
        }

        for h in reg.list_by_kind(BodyKind::Comet) {
            if let Some(comet) = reg.get_mut(h) {
                let o = &mut comet.orbit;
                o.angle += o.speed * o.direction;
                comet.position = orbit::comet_point(o.a, o.b, o.inclination, o.angle);
            }
        }
    }

    // ── Additions ───────────────────────────────────────────────────

    /// Add a planet with random size, distance and speed.
    pub fn add_random_planet(&mut self, rng: &mut Rng) -> SimResult<BodyHandle> {
        let c = &self.config;
        if self.registry.count(BodyKind::Planet) >= c.max_planets {
            return Err(SimError::CapacityExceeded { what: "planets", limit: c.max_planets });
        }
        let radius = draw(rng, c.planet_radius);
        let a = draw(rng, c.planet_distance);
        let speed = draw(rng, c.planet_speed);
        let spin = draw(rng, c.planet_spin);
        let color = Color::new(rng.next_f64() as f32, rng.next_f64() as f32, rng.next_f64() as f32);
        let b = a * c.semi_minor_ratio;

        let name = format!("Planet {}", self.planets_added + 1);
        let body = Body::new(BodyKind::Planet, name, radius, Orbit::ellipse(a, b, speed))
            .with_spin(spin)
            .with_color(color)
            .with_position(orbit::ellipse_point(a, b, 0.0));
        let handle = self.registry.add(body)?;
        self.planets_added += 1;
        Ok(handle)
    }

    /// Add a moon around `parent`.
    pub fn add_moon(&mut self, parent: BodyHandle, rng: &mut Rng) -> SimResult<BodyHandle> {
        let c = &self.config;
        let planet = self
            .registry
            .get(parent)
            .filter(|b| b.kind == BodyKind::Planet)
            .ok_or_else(|| SimError::NoSuchBody("selected planet".into()))?;
        let count = self.registry.moons_of(parent).len();
        if count >= c.max_moons_per_planet {
            return Err(SimError::CapacityExceeded {
                what: "moons for this planet",
                limit: c.max_moons_per_planet,
            });
        }
        let radius = draw(rng, c.moon_radius);
        let r = planet.radius + draw(rng, c.moon_gap);
        let speed = draw(rng, c.moon_speed);
        let name = format!("{} moon {}", planet.name, count + 1);
        let position = orbit::circle_point(planet.position, r, 0.0);

        let body = Body::new(BodyKind::Moon, name, radius, Orbit::ellipse(r, r, speed))
            .with_spin(bodies::MOON_SPIN_RATE)
            .with_color(bodies::MOON_COLOR)
            .with_texture(bodies::MOON_TEXTURE)
            .with_parent(parent)
            .with_position(position);
        self.registry.add(body)
    }

    /// Add a comet. `color` is `#rrggbb`, `direction` is
    /// `clockwise|counterclockwise|1|-1`.
    pub fn add_comet(&mut self, color: &str, direction: &str, rng: &mut Rng) -> SimResult<BodyHandle> {
        let color = parse_hex_color(color)?;
        let sign = Direction::parse(direction)?.sign();
        let c = &self.config;
        let a = draw(rng, c.comet_distance);
        let eccentricity = draw(rng, c.comet_eccentricity);
        let inclination = draw(rng, c.comet_inclination);
        let speed = draw(rng, c.comet_speed);

        let elements = Orbit {
            a,
            b: a * eccentricity,
            speed,
            angle: 0.0,
            inclination,
            direction: sign,
        };
        let name = format!("Comet {}", self.comets_added + 1);
        let body = Body::new(BodyKind::Comet, name, COMET_RADIUS, elements)
            .with_color(color)
            .with_position(orbit::comet_point(elements.a, elements.b, inclination, 0.0));
        let handle = self.registry.add(body)?;
        self.comets_added += 1;
        Ok(handle)
    }

    /// Add a scripted model around its named planet. Fails with `NoSuchBody`
    /// when that planet has been removed.
    pub fn add_scripted(&mut self, model: ScriptedModel) -> SimResult<()> {
        if self.registry.scripted(model).is_some() {
            return Err(SimError::DuplicateSingleton(model.name().to_string()));
        }
        let name = model.tether().anchor;
        let anchor = self
            .registry
            .list_by_kind(BodyKind::Planet)
            .into_iter()
            .find(|h| self.registry.get(*h).is_some_and(|b| b.name == name))
            .ok_or_else(|| SimError::NoSuchBody(format!("{name} (anchor of {})", model.name())))?;
        let mut instance = ScriptedInstance::new(model, anchor);
        if let Some(planet) = self.registry.get(anchor) {
            let t = instance.tether;
            instance.position = orbit::tethered_point(planet.position, t.radius, t.inclination, 0.0);
        }
        self.registry.add_scripted(instance)
    }
}

fn draw(rng: &mut Rng, bounds: crate::config::Bounds) -> f64 {
    rng.range(bounds.min, bounds.max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulation {
        Simulation::populated(SimConfig::default())
    }

    #[test]
    fn initial_planets_sit_on_the_x_axis() {
        let sim = sim();
        let planets = sim.registry.list_by_kind(BodyKind::Planet);
        assert_eq!(planets.len(), 8);
        let distances = [3.0, 5.0, 7.0, 9.0, 12.0, 15.0, 18.0, 21.0];
        for (h, d) in planets.iter().zip(distances) {
            let body = sim.registry.get(*h).unwrap();
            assert_eq!(body.orbit.angle, 0.0);
            assert_eq!(body.position, DVec3::new(d, 0.0, 0.0));
        }
    }

    #[test]
    fn mercury_after_one_second() {
        let mut sim = sim();
        sim.tick(1.0);
        let mercury = sim.registry.get(sim.registry.planet_at(0).unwrap()).unwrap();
        let expected = 0.02 * 100.0 * std::f64::consts::PI / 180.0;
        assert!((mercury.orbit.angle - expected).abs() < 1e-12);
        assert!((mercury.orbit.angle - 0.0349).abs() < 1e-4);
        let p = mercury.position;
        assert!((p.x - 3.0 * expected.cos()).abs() < 1e-12);
        assert_eq!(p.y, 0.0);
        assert!((p.z - 2.4 * expected.sin()).abs() < 1e-12);
    }

    #[test]
    fn planet_angles_accumulate_exactly() {
        let mut a = sim();
        let mut b = sim();
        for _ in 0..120 {
            a.tick(1.0 / 60.0);
        }
        for _ in 0..120 {
            b.tick(1.0 / 60.0);
        }
        let earth = |s: &Simulation| s.registry.get(s.registry.planet_at(2).unwrap()).unwrap().orbit.angle;
        assert_eq!(earth(&a), earth(&b));
        let expected = 0.01 * orbit::angular_speed(100.0) * (1.0 / 60.0) * 120.0;
        assert!((earth(&a) - expected).abs() < 1e-9);
    }

    #[test]
    fn planets_stay_on_their_ellipse() {
        let mut sim = sim();
        for _ in 0..500 {
            sim.tick(1.0 / 60.0);
            for h in sim.registry.list_by_kind(BodyKind::Planet) {
                let body = sim.registry.get(h).unwrap();
                let p = body.position;
                let k = (p.x / body.orbit.a).powi(2) + (p.z / body.orbit.b).powi(2);
                assert!((k - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn moons_advance_by_fixed_increment_around_parent() {
        let mut sim = sim();
        let mut rng = Rng::new(7);
        let earth = sim.registry.planet_at(2).unwrap();
        let moon = sim.add_moon(earth, &mut rng).unwrap();
        let speed = sim.registry.get(moon).unwrap().orbit.speed;

        // Independent of dt and sim speed.
        sim.set_sim_speed("5000");
        sim.tick(0.5);
        sim.tick(0.01);
        let m = sim.registry.get(moon).unwrap();
        assert!((m.orbit.angle - 2.0 * speed).abs() < 1e-12);
        let parent = sim.registry.get(earth).unwrap().position;
        assert!(((m.position - parent).length() - m.orbit.a).abs() < 1e-9);
        assert_eq!(m.position.y, parent.y);
    }

    #[test]
    fn comets_follow_direction_sign() {
        let mut sim = sim();
        let mut rng = Rng::new(3);
        let cw = sim.add_comet("#ff8800", "clockwise", &mut rng).unwrap();
        let ccw = sim.add_comet("#00ff00", "1", &mut rng).unwrap();
        sim.tick(1.0);
        assert!(sim.registry.get(cw).unwrap().orbit.angle < 0.0);
        assert!(sim.registry.get(ccw).unwrap().orbit.angle > 0.0);
        let c = sim.registry.get(cw).unwrap();
        assert!(c.orbit.b < c.orbit.a);
    }

    #[test]
    fn comet_input_is_validated() {
        let mut sim = sim();
        let mut rng = Rng::new(3);
        assert!(matches!(sim.add_comet("red", "clockwise", &mut rng), Err(SimError::InvalidInput(_))));
        assert!(matches!(sim.add_comet("#ff0000", "sideways", &mut rng), Err(SimError::InvalidInput(_))));
        assert_eq!(sim.registry.count(BodyKind::Comet), 0);
    }

    #[test]
    fn random_planets_fill_up_to_the_cap() {
        let mut sim = sim();
        let mut rng = Rng::new(11);
        sim.add_random_planet(&mut rng).unwrap();
        let h = sim.add_random_planet(&mut rng).unwrap();
        assert_eq!(sim.registry.get(h).unwrap().name, "Planet 2");
        let err = sim.add_random_planet(&mut rng).unwrap_err();
        assert!(matches!(err, SimError::CapacityExceeded { limit: 10, .. }));
        assert_eq!(sim.registry.count(BodyKind::Planet), 10);

        let d = sim.registry.get(h).unwrap().orbit.a;
        assert!(sim.config.planet_distance.contains(d));
    }

    #[test]
    fn enterprise_only_once() {
        let mut sim = sim();
        sim.add_scripted(ScriptedModel::Enterprise).unwrap();
        let err = sim.add_scripted(ScriptedModel::Enterprise).unwrap_err();
        assert_eq!(err, SimError::DuplicateSingleton("Enterprise".into()));
        assert_eq!(sim.registry.scripted_iter().filter(|s| s.model == ScriptedModel::Enterprise).count(), 1);
    }

    #[test]
    fn scripted_model_orbits_its_anchor() {
        let mut sim = sim();
        sim.add_scripted(ScriptedModel::Enterprise).unwrap();
        sim.tick(1.0 / 60.0);
        let s = sim.registry.scripted(ScriptedModel::Enterprise).unwrap();
        let earth = sim.registry.get(s.anchor).unwrap();
        assert_eq!(earth.name, "Earth");
        assert!((s.theta - s.tether.speed).abs() < 1e-12);
        let offset = s.position - earth.position;
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        assert!((horizontal - s.tether.radius).abs() < 1e-9);
    }

    #[test]
    fn removing_anchor_detaches_scripted_model() {
        let mut sim = sim();
        let mut rng = Rng::new(5);
        sim.add_scripted(ScriptedModel::Enterprise).unwrap();
        let earth = sim.registry.planet_at(2).unwrap();
        sim.add_moon(earth, &mut rng).unwrap();
        let before = sim.registry.len();
        let removal = sim.registry.remove(earth).unwrap();
        assert_eq!(sim.registry.len(), before - removal.bodies_removed());
        assert_eq!(removal.scripted.len(), 1);
        assert!(sim.registry.scripted(ScriptedModel::Enterprise).is_none());
        // The next tick is fine without the anchor.
        sim.tick(1.0 / 60.0);
        // With Earth gone the Enterprise has nowhere to go.
        assert!(matches!(sim.add_scripted(ScriptedModel::Enterprise), Err(SimError::NoSuchBody(_))));
    }

    #[test]
    fn scripted_model_keeps_its_planet_after_earlier_removals() {
        let mut sim = sim();
        let mercury = sim.registry.planet_at(0).unwrap();
        sim.registry.remove(mercury).unwrap();

        sim.add_scripted(ScriptedModel::Enterprise).unwrap();
        let anchor = sim.registry.scripted(ScriptedModel::Enterprise).unwrap().anchor;
        assert_eq!(sim.registry.get(anchor).unwrap().name, "Earth");
        // Earth is now display index 1.
        assert_eq!(sim.registry.planet_at(1), Some(anchor));
    }

    #[test]
    fn sim_speed_parsing() {
        let mut sim = sim();
        assert!(sim.set_sim_speed("250").is_none());
        assert_eq!(sim.sim_speed(), 250.0);
        assert!(sim.set_sim_speed("abc").is_some());
        assert_eq!(sim.sim_speed(), 100.0);
        assert!(sim.set_sim_speed("99999").is_some());
        assert_eq!(sim.sim_speed(), 10_000.0);
        assert!(sim.set_sim_speed("0").is_some());
        assert_eq!(sim.sim_speed(), 0.1);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#ff0000").unwrap(), Color::new(1.0, 0.0, 0.0));
        assert!(parse_hex_color("#ff00").is_err());
        assert!(parse_hex_color("ff0000").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }
}
