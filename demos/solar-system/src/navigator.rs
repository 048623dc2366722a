//! Free-fly camera: mouse look while pointer-locked, WASD/RQ movement always.

use glam::Vec3;
use orrery_engine::{key_codes, Camera3D, InputEvent, KeyboardState};

use crate::config::SimConfig;

const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookMode {
    /// Mouse deltas rotate the camera.
    Locked,
    /// Mouse is free for the panel; only keys move the camera.
    Unlocked,
}

pub struct Navigator {
    keys: KeyboardState,
    mode: LookMode,
    /// Units per tick.
    move_speed: f32,
    sprint_speed: f32,
    /// Radians per pixel.
    sensitivity: f32,
}

impl Navigator {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            keys: KeyboardState::new(),
            mode: LookMode::Unlocked,
            move_speed: config.move_speed as f32,
            sprint_speed: config.sprint_speed as f32,
            sensitivity: config.mouse_sensitivity as f32,
        }
    }

    pub fn apply_config(&mut self, config: &SimConfig) {
        self.move_speed = config.move_speed as f32;
        self.sprint_speed = config.sprint_speed as f32;
        self.sensitivity = config.mouse_sensitivity as f32;
    }

    pub fn mode(&self) -> LookMode {
        self.mode
    }

    /// Feed one input event.
    pub fn handle(&mut self, event: &InputEvent, camera: &mut Camera3D) {
        self.keys.apply(event);
        match *event {
            InputEvent::PointerLock { locked: true } => self.mode = LookMode::Locked,
            // Losing the lock usually means losing focus too; keys released
            // elsewhere would otherwise keep the camera moving.
            InputEvent::PointerLock { locked: false } => {
                self.mode = LookMode::Unlocked;
                self.keys.release_all();
            }
            // The platform drops the lock on Escape; don't wait for the host to say so.
            InputEvent::KeyDown { key_code } if key_code == key_codes::ESCAPE => {
                self.mode = LookMode::Unlocked;
            }
            InputEvent::MouseDelta { dx, dy } if self.mode == LookMode::Locked => {
                camera.yaw -= dx * self.sensitivity;
                camera.pitch = (camera.pitch - dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
            }
            _ => {}
        }
    }

    /// Held keys as (strafe, vertical, forward), each in -1..=1, normalized.
    fn input_vector(&self) -> Vec3 {
        let axis = |pos: u32, neg: u32| {
            (self.keys.is_pressed(pos) as i32 - self.keys.is_pressed(neg) as i32) as f32
        };
        Vec3::new(
            axis(key_codes::D, key_codes::A),
            axis(key_codes::R, key_codes::Q),
            axis(key_codes::W, key_codes::S),
        )
        .normalize_or_zero()
    }

    /// Translate the camera by one tick of held-key movement.
    pub fn step(&self, camera: &mut Camera3D) {
        let input = self.input_vector();
        if input == Vec3::ZERO {
            return;
        }
        // Facing projected onto the horizontal plane.
        let (sin, cos) = camera.yaw.sin_cos();
        let forward = Vec3::new(-sin, 0.0, -cos);
        let right = Vec3::new(cos, 0.0, -sin);

        let speed = if self.keys.is_pressed(key_codes::SHIFT) {
            self.sprint_speed
        } else {
            self.move_speed
        };
        let world = right * input.x + Vec3::Y * input.y + forward * input.z;
        camera.position += world * speed;
    }
}
