/// Initial scene contents and fixed visual properties.

use orrery_engine::Color;

/// Seed data for one of the eight initial planets.
pub struct PlanetSeed {
    pub name: &'static str,
    pub radius: f64,
    /// Semi-major axis; b is derived from `SimConfig::semi_minor_ratio`.
    pub distance: f64,
    pub color: u32,
    /// Relative orbital speed (multiplied by the simulation speed).
    pub speed: f64,
    pub texture: &'static str,
}

pub const PLANETS: [PlanetSeed; 8] = [
    PlanetSeed { name: "Mercury", radius: 0.2, distance: 3.0,  color: 0xaaaaaa, speed: 0.02,  texture: "textures/mercury.jpg" },
    PlanetSeed { name: "Venus",   radius: 0.4, distance: 5.0,  color: 0xffcc00, speed: 0.015, texture: "textures/venus.jpg" },
    PlanetSeed { name: "Earth",   radius: 0.5, distance: 7.0,  color: 0x0000ff, speed: 0.01,  texture: "textures/earth.jpg" },
    PlanetSeed { name: "Mars",    radius: 0.3, distance: 9.0,  color: 0xff0000, speed: 0.008, texture: "textures/mars.jpg" },
    PlanetSeed { name: "Jupiter", radius: 1.0, distance: 12.0, color: 0xffa500, speed: 0.005, texture: "textures/jupiter.jpg" },
    PlanetSeed { name: "Saturn",  radius: 0.9, distance: 15.0, color: 0xffff00, speed: 0.004, texture: "textures/saturn.jpg" },
    PlanetSeed { name: "Uranus",  radius: 0.7, distance: 18.0, color: 0x00ffff, speed: 0.003, texture: "textures/uranus.jpg" },
    PlanetSeed { name: "Neptune", radius: 0.7, distance: 21.0, color: 0x0000ff, speed: 0.002, texture: "textures/neptune.jpg" },
];

/// Self-rotation rate of the initial planets.
pub const PLANET_SPIN_RATE: f64 = 0.5;
/// Self-rotation rate of added moons (radians/second, not scaled by sim speed).
pub const MOON_SPIN_RATE: f64 = 0.3;

/// Index into `PLANETS` of the ringed planet.
pub const RINGED_PLANET: usize = 5;
/// Ring radii as multiples of the planet radius.
pub const RING_INNER: f32 = 1.3;
pub const RING_OUTER: f32 = 2.2;
pub const RING_TILT: f32 = 0.45;
pub const RING_COLOR: Color = Color::new(0.85, 0.75, 0.55);
pub const RING_OPACITY: f32 = 0.7;

// ── Sun ──────────────────────────────────────────────────────────────

pub const SUN_RADIUS: f32 = 2.0;
pub const SUN_COLOR: u32 = 0xffff00;
pub const SUN_EMISSIVE: f32 = 1.0;
/// Glow shell radius as a multiple of the sun radius.
pub const SUN_GLOW_SCALE: f32 = 1.25;
pub const SUN_GLOW_COLOR: Color = Color::new(1.0, 0.8, 0.3);
/// Light range in world units.
pub const SUN_LIGHT_RANGE: f32 = 200.0;

// ── Orbit paths ──────────────────────────────────────────────────────

pub const ORBIT_PATH_COLOR: Color = Color::new(0.5, 0.5, 0.55);
pub const ORBIT_PATH_OPACITY: f32 = 0.35;

pub const MOON_COLOR: Color = Color::new(0.75, 0.75, 0.72);
pub const MOON_TEXTURE: &str = "textures/moon.jpg";
