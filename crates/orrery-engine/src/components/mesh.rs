/// Linear RGB color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Slot index of a texture the host has finished loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSlot(pub u32);

/// Slot index of a 3D model the host has finished loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModelSlot(pub u32);

/// Geometry the host should draw for an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// UV sphere.
    Sphere { radius: f32 },
    /// Flat annulus in the entity's local XZ plane.
    Ring { inner: f32, outer: f32 },
    /// Closed ellipse line in the local XZ plane (x = a·cos, z = b·sin).
    OrbitPath { a: f32, b: f32 },
    /// A loaded model.
    Model { model: ModelSlot },
}

impl Shape {
    /// Wire code written into the render instance.
    pub fn code(&self) -> f32 {
        match self {
            Shape::Sphere { .. } => 0.0,
            Shape::Ring { .. } => 1.0,
            Shape::OrbitPath { .. } => 2.0,
            Shape::Model { .. } => 3.0,
        }
    }

    /// The two shape parameters packed into the render instance.
    pub fn params(&self) -> [f32; 2] {
        match *self {
            Shape::Sphere { radius } => [radius, 0.0],
            Shape::Ring { inner, outer } => [inner, outer],
            Shape::OrbitPath { a, b } => [a, b],
            Shape::Model { model } => [model.0 as f32, 0.0],
        }
    }
}

/// Renderable surface of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshComponent {
    pub shape: Shape,
    pub color: Color,
    /// Surface texture, once loaded. `None` renders flat `color`.
    pub texture: Option<TextureSlot>,
    /// 0.0 = lit by scene lights, >0 = self-illuminated (sun, glow).
    pub emissive: f32,
    pub opacity: f32,
}

impl Default for MeshComponent {
    fn default() -> Self {
        Self {
            shape: Shape::Sphere { radius: 1.0 },
            color: Color::default(),
            texture: None,
            emissive: 0.0,
            opacity: 1.0,
        }
    }
}

impl MeshComponent {
    pub fn new(shape: Shape, color: Color) -> Self {
        Self {
            shape,
            color,
            ..Default::default()
        }
    }

    pub fn sphere(radius: f32, color: Color) -> Self {
        Self::new(Shape::Sphere { radius }, color)
    }

    pub fn with_emissive(mut self, emissive: f32) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_texture(mut self, texture: TextureSlot) -> Self {
        self.texture = Some(texture);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_color_unpacks_channels() {
        let c = Color::from_hex(0xFF8000);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn shape_params_pack_dimensions() {
        assert_eq!(Shape::Ring { inner: 1.2, outer: 2.0 }.params(), [1.2, 2.0]);
        assert_eq!(Shape::OrbitPath { a: 3.0, b: 2.4 }.code(), 2.0);
        assert_eq!(Shape::Model { model: ModelSlot(4) }.params()[0], 4.0);
    }
}
