use pmath::ray::Ray;
use pmath::vector::Vec3;

/// The z = 0 plane of its local space with the normal along +z. Everything below it
/// counts as inside.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plane;

impl Plane {
    pub fn new() -> Self {
        Plane
    }

    /// Rays (nearly) parallel to the plane never hit it.
    pub fn intersect(&self, ray: Ray<f64>, eps: f64) -> Option<f64> {
        if ray.dir.z.abs() < eps {
            return None;
        }
        Some(-ray.org.z / ray.dir.z)
    }

    pub fn inside(&self, p: Vec3<f64>) -> bool {
        p.z <= 0.
    }

    pub fn normal(&self) -> Vec3<f64> {
        Vec3::new(0., 0., 1.)
    }
}
