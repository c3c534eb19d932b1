use pmath::quadratic;
use pmath::ray::Ray;
use pmath::vector::Vec3;

/// A sphere centered at the origin of its local space. Use the surface's
/// transformation to move it around.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    radius: f64,
}

impl Sphere {
    pub fn new(radius: f64) -> Self {
        Sphere { radius }
    }

    /// Returns both roots of the ray-sphere equation in ascending order. They are
    /// returned raw (possibly negative) since CSG needs the whole interval.
    pub fn intersect(&self, ray: Ray<f64>) -> Option<(f64, f64)> {
        // Now we need to solve the following quadratic equation:
        let a = ray.d_dot_d();
        let b = 2. * ray.o_dot_d();
        let c = ray.o_dot_o() - self.radius * self.radius;

        quadratic(a, b, c)
    }

    pub fn inside(&self, p: Vec3<f64>) -> bool {
        p.length2() <= self.radius * self.radius
    }

    pub fn normal(&self, p: Vec3<f64>) -> Vec3<f64> {
        p.normalize()
    }
}
