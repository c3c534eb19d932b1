use crate::numbers::Float;
use crate::vector::Vec3;

/// A ray used to intersect a scene.
///
/// The direction is not required to be normalized: transforming a ray into a
/// surface's local space keeps the parametric distances unchanged, so a `t`
/// found in local space is valid for the original ray as well.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray<T: Float> {
    /// The origin point of the ray.
    pub org: Vec3<T>,
    /// The direction vector of the ray.
    pub dir: Vec3<T>,
}

impl<T: Float> Ray<T> {
    pub fn new(org: Vec3<T>, dir: Vec3<T>) -> Self {
        Ray { org, dir }
    }

    /// Calculates a point along the ray given a parametric parameter.
    pub fn point_at(self, t: T) -> Vec3<T> {
        self.org + self.dir.scale(t)
    }

    // These are the three terms of the ray-sphere quadratic:

    pub fn o_dot_o(self) -> T {
        self.org.dot(self.org)
    }

    pub fn o_dot_d(self) -> T {
        self.org.dot(self.dir)
    }

    pub fn d_dot_d(self) -> T {
        self.dir.dot(self.dir)
    }
}
