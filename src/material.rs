use crate::spectrum::Color;
use pmath::vector::Vec3;

use bitflags::bitflags;

bitflags! {
    pub struct ShadeSides : u32 {
        // Light arriving on the side the normal points to:
        const FRONT = 1 << 0;
        // Light arriving from behind the surface:
        const BACK = 1 << 1;
    }
}

/// A specular highlight on top of the diffuse response.
#[derive(Clone, Copy, Debug)]
pub struct Highlight {
    pub color: Color,
    pub exponent: f64,
}

/// How a surface responds to a single light direction.
#[derive(Clone, Copy, Debug)]
pub struct Material {
    pub color: Color,
    pub sides: ShadeSides,
    pub highlight: Option<Highlight>,
}

impl Material {
    pub fn diffuse(color: Color) -> Self {
        Material {
            color,
            sides: ShadeSides::FRONT,
            highlight: None,
        }
    }

    pub fn with_highlight(self, color: Color, exponent: f64) -> Self {
        Material {
            highlight: Some(Highlight { color, exponent }),
            ..self
        }
    }

    pub fn with_sides(self, sides: ShadeSides) -> Self {
        Material { sides, ..self }
    }

    /// Computes the reflected color for light of color `light` arriving along `to_light`.
    ///
    /// # Arguments
    /// * `normal` - Unit surface normal at the hit point.
    /// * `to_light` - Unit direction from the hit point toward the light.
    /// * `to_viewer` - Unit direction from the hit point back toward the ray origin.
    /// * `light` - Color (already attenuated) of the incoming light.
    pub fn response(
        &self,
        normal: Vec3<f64>,
        to_light: Vec3<f64>,
        to_viewer: Vec3<f64>,
        light: Color,
    ) -> Color {
        let cos = normal.dot(to_light);

        let diffuse = if cos > 0. && self.sides.contains(ShadeSides::FRONT) {
            cos
        } else if cos < 0. && self.sides.contains(ShadeSides::BACK) {
            -cos
        } else {
            0.
        };
        let mut result = self.color * light.scale(diffuse);

        // Blinn-Phong, only on the lit side:
        if let Some(highlight) = self.highlight {
            if cos > 0. {
                let half = (to_light + to_viewer).normalize();
                let spec = normal.dot(half);
                if spec > 0. {
                    result += highlight.color * light.scale(spec.powf(highlight.exponent));
                }
            }
        }

        result
    }
}
