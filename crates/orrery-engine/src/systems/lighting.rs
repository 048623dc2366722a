/// Point lights for the 3D scene.
///
/// Lights are persistent: they stay until explicitly removed.
/// Each frame the runner exposes the light list to the host's lighting pass.

use glam::Vec3;

/// A point light with position, color, intensity and range.
///
/// Wire format (8 floats / 32 bytes):
/// `[x, y, z, r, g, b, intensity, range]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct PointLight {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub intensity: f32,
    /// Falloff distance in world units (0 = infinite).
    pub range: f32,
}

impl PointLight {
    pub fn new(pos: Vec3, color: [f32; 3], intensity: f32, range: f32) -> Self {
        Self {
            x: pos.x,
            y: pos.y,
            z: pos.z,
            r: color[0],
            g: color[1],
            b: color[2],
            intensity,
            range,
        }
    }

    pub fn pos(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Index of a light inside a `LightState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightId(pub usize);

/// Manages active lights and ambient color for the scene.
pub struct LightState {
    lights: Vec<PointLight>,
    ambient: [f32; 3],
}

impl LightState {
    pub fn new() -> Self {
        Self::with_capacity(8)
    }

    pub fn with_capacity(max_lights: usize) -> Self {
        Self {
            lights: Vec::with_capacity(max_lights),
            ambient: [0.1, 0.1, 0.12],
        }
    }

    /// Add a point light to the scene.
    pub fn add(&mut self, light: PointLight) -> LightId {
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    pub fn get(&self, id: LightId) -> Option<&PointLight> {
        self.lights.get(id.0)
    }

    pub fn get_mut(&mut self, id: LightId) -> Option<&mut PointLight> {
        self.lights.get_mut(id.0)
    }

    /// Remove all lights.
    pub fn clear(&mut self) {
        self.lights.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointLight> {
        self.lights.iter()
    }

    /// Number of active lights.
    pub fn count(&self) -> usize {
        self.lights.len()
    }

    /// Set the ambient light color.
    pub fn set_ambient(&mut self, r: f32, g: f32, b: f32) {
        self.ambient = [r, g, b];
    }

    pub fn ambient(&self) -> [f32; 3] {
        self.ambient
    }

    /// Pointer to the lights data for shared-buffer reads.
    pub fn buffer_ptr(&self) -> *const f32 {
        self.lights.as_ptr() as *const f32
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::protocol::LIGHT_FLOATS;

    #[test]
    fn add_returns_stable_index() {
        let mut state = LightState::new();
        let sun = state.add(PointLight::new(Vec3::ZERO, [1.0, 1.0, 0.9], 50.0, 0.0));
        let fill = state.add(PointLight::new(Vec3::Y, [0.2; 3], 1.0, 10.0));
        assert_eq!(state.count(), 2);
        assert_eq!(state.get(sun).unwrap().intensity, 50.0);
        assert_eq!(state.get(fill).unwrap().pos(), Vec3::Y);
    }

    #[test]
    fn get_mut_updates_intensity() {
        let mut state = LightState::new();
        let id = state.add(PointLight::new(Vec3::ZERO, [1.0; 3], 1.0, 0.0));
        state.get_mut(id).unwrap().intensity = 120.0;
        assert_eq!(state.get(id).unwrap().intensity, 120.0);
        state.clear();
        assert!(state.get(id).is_none());
    }

    #[test]
    fn point_light_is_8_floats() {
        assert_eq!(std::mem::size_of::<PointLight>(), LIGHT_FLOATS * 4);
    }
}
