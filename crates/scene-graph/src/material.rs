//! Surface materials.

/// Which faces are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Basic unlit/lit material description.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Linear RGBA color.
    pub color: [f32; 4],
    pub wireframe: bool,
    pub side: Side,
    /// Texture location; loading is left to the backend.
    pub texture: Option<String>,
    /// Blend with what is behind.
    pub transparent: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            wireframe: false,
            side: Side::Front,
            texture: None,
            transparent: false,
        }
    }
}

impl Material {
    /// Solid color material.
    pub fn color(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            color: [r, g, b, a],
            transparent: a < 1.0,
            ..Self::default()
        }
    }

    /// Attach a texture.
    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    /// Set rendered side.
    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    /// Opacity (alpha channel).
    pub fn opacity(&self) -> f32 {
        self.color[3]
    }
}
