use bytemuck::{Pod, Zeroable};

/// Per-instance render data written to the shared buffer for the host renderer.
/// Must match the host protocol: 20 floats = 80 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
pub struct RenderInstance {
    /// Position in world space.
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Orientation quaternion.
    pub qx: f32,
    pub qy: f32,
    pub qz: f32,
    pub qw: f32,
    /// Per-axis scale.
    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
    /// Base color.
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub opacity: f32,
    /// Self-illumination multiplier.
    pub emissive: f32,
    /// Shape code (see `Shape::code`).
    pub shape: f32,
    /// Shape parameters (radius, ring radii, ellipse axes, model slot).
    pub param_a: f32,
    pub param_b: f32,
    /// Texture slot, or -1.0 for untextured.
    pub texture: f32,
    pub _pad: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 20;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Render buffer containing all mesh instances for one frame.
pub struct RenderBuffer {
    /// Opaque instances first, then translucent ones after `translucent_split`.
    pub instances: Vec<RenderInstance>,
    /// Index of the first translucent instance (drawn after depth-writing passes).
    pub translucent_split: u32,
    max_instances: usize,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(max_instances: usize) -> Self {
        Self {
            instances: Vec::with_capacity(max_instances),
            translucent_split: 0,
            max_instances,
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.translucent_split = 0;
    }

    /// Push an instance. Returns false once the shared buffer section is full.
    pub fn push(&mut self, instance: RenderInstance) -> bool {
        if self.instances.len() >= self.max_instances {
            return false;
        }
        self.instances.push(instance);
        true
    }

    pub fn set_translucent_split(&mut self, split: u32) {
        self.translucent_split = split;
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for shared-buffer reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_instance_is_20_floats() {
        assert_eq!(std::mem::size_of::<RenderInstance>(), RenderInstance::STRIDE_BYTES);
        assert_eq!(RenderInstance::FLOATS, 20);
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut buf = RenderBuffer::with_capacity(2);
        assert!(buf.push(RenderInstance::default()));
        assert!(buf.push(RenderInstance::default()));
        assert!(!buf.push(RenderInstance::default()));
        assert_eq!(buf.instance_count(), 2);
    }
}
