// Represents color in the renderer:

use num_traits::clamp;

use std::ops::{Add, AddAssign, Mul};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Color { r, g, b }
    }

    pub fn from_scalar(s: f64) -> Self {
        Color { r: s, g: s, b: s }
    }

    // Just a fancy way of returning 0 for everything:
    pub fn black() -> Self {
        Color {
            r: 0.,
            g: 0.,
            b: 0.,
        }
    }

    pub fn white() -> Self {
        Color {
            r: 1.,
            g: 1.,
            b: 1.,
        }
    }

    // Multiplies all of the components by the scale value:
    pub fn scale(self, s: f64) -> Self {
        Color {
            r: self.r * s,
            g: self.g * s,
            b: self.b * s,
        }
    }

    // Divides all of the components by the scale value:
    pub fn div_scale(self, s: f64) -> Self {
        Color {
            r: self.r / s,
            g: self.g / s,
            b: self.b / s,
        }
    }

    pub fn is_black(self) -> bool {
        self.r == 0. && self.g == 0. && self.b == 0.
    }

    pub fn clamp(self, low: f64, high: f64) -> Self {
        Color {
            r: clamp(self.r, low, high),
            g: clamp(self.g, low, high),
            b: clamp(self.b, low, high),
        }
    }

    /// Largest component, used as a rough brightness.
    pub fn max_component(self) -> f64 {
        pmath::max(self.r, pmath::max(self.g, self.b))
    }
}

impl Add for Color {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Color {
            r: self.r + rhs.r,
            g: self.g + rhs.g,
            b: self.b + rhs.b,
        }
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

// Element-wise product (filtering one color by another):
impl Mul for Color {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Color {
            r: self.r * rhs.r,
            g: self.g * rhs.g,
            b: self.b * rhs.b,
        }
    }
}
