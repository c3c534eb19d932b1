use pmath::ray::Ray;
use pmath::vector::Vec3;

#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub v0: Vec3<f64>,
    pub v1: Vec3<f64>,
    pub v2: Vec3<f64>,
}

impl Triangle {
    pub fn new(v0: Vec3<f64>, v1: Vec3<f64>, v2: Vec3<f64>) -> Self {
        Triangle { v0, v1, v2 }
    }

    /// Möller-Trumbore. Returns the raw parametric distance of the hit (which can be
    /// behind the origin) or `None` when the ray misses or is parallel.
    ///
    /// The determinant grows with the edge lengths and the ray's length, so the
    /// parallel test is taken relative to them. `eps` is the sine of the smallest
    /// angle between the ray and the triangle's plane.
    pub fn intersect(&self, ray: Ray<f64>, eps: f64) -> Option<f64> {
        let e1 = self.v1 - self.v0;
        let e2 = self.v2 - self.v0;

        let pvec = ray.dir.cross(e2);
        let det = e1.dot(pvec);
        let scale = e1.length() * e2.length() * ray.dir.length();
        if det.abs() <= eps * scale {
            return None;
        }
        let inv_det = 1. / det;

        let tvec = ray.org - self.v0;
        let u = tvec.dot(pvec) * inv_det;
        if u < 0. || u > 1. {
            return None;
        }

        let qvec = tvec.cross(e1);
        let v = ray.dir.dot(qvec) * inv_det;
        if v < 0. || u + v > 1. {
            return None;
        }

        Some(e2.dot(qvec) * inv_det)
    }

    /// Geometric normal following the winding order (v0, v1, v2).
    pub fn normal(&self) -> Vec3<f64> {
        (self.v1 - self.v0).cross(self.v2 - self.v0).normalize()
    }

    /// Distance from a point to the triangle's plane.
    pub fn plane_dist(&self, p: Vec3<f64>) -> f64 {
        self.normal().dot(p - self.v0).abs()
    }
}
