use pmath::matrix::Mat3x4;
use pmath::ray::Ray;
use pmath::vector::Vec3;

use simple_error::{SimpleError, SimpleResult};

use std::ops::Mul;

/// An affine transformation that keeps its inverse around, so that moving a ray into
/// a surface's local space never has to invert a matrix on the hot path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transf {
    frd: Mat3x4<f64>,
    inv: Mat3x4<f64>,
}

impl Transf {
    pub fn from_mat3x4(mat: Mat3x4<f64>) -> SimpleResult<Self> {
        let inv = mat
            .inverse()
            .ok_or_else(|| SimpleError::new("Transformation matrix is not invertible."))?;
        Ok(Transf { frd: mat, inv })
    }

    pub fn new_identity() -> Self {
        Transf {
            frd: Mat3x4::new_identity(),
            inv: Mat3x4::new_identity(),
        }
    }

    pub fn new_translate(trans: Vec3<f64>) -> Self {
        Transf {
            frd: Mat3x4::new_translate(trans),
            inv: Mat3x4::new_translate(-trans),
        }
    }

    /// Creates a scaling transformation. A zero component gives a singular transform,
    /// so the components must all be non-zero.
    pub fn new_scale(scale: Vec3<f64>) -> Self {
        Transf {
            frd: Mat3x4::new_scale(scale),
            inv: Mat3x4::new_scale(Vec3::new(1. / scale.x, 1. / scale.y, 1. / scale.z)),
        }
    }

    pub fn new_rotate(deg: f64, axis: Vec3<f64>) -> Self {
        let frd = Mat3x4::new_rotate(deg, axis);
        // inverse of rotation matrix is transpose
        Transf {
            frd,
            inv: frd.transpose_linear(),
        }
    }

    /// Inverses the transformation
    pub fn inverse(self) -> Self {
        Transf {
            frd: self.inv,
            inv: self.frd,
        }
    }

    pub fn point(self, p: Vec3<f64>) -> Vec3<f64> {
        self.frd.mul_vec_one(p)
    }

    pub fn vector(self, v: Vec3<f64>) -> Vec3<f64> {
        self.frd.mul_vec_zero(v)
    }

    /// Transforms a normal (by the inverse transpose). The result is not normalized.
    pub fn normal(self, n: Vec3<f64>) -> Vec3<f64> {
        self.inv.transpose_linear().mul_vec_zero(n)
    }

    /// Transforms a ray. The direction keeps its length, so hit distances found with
    /// the transformed ray are valid for the original one.
    pub fn ray(self, r: Ray<f64>) -> Ray<f64> {
        Ray {
            org: self.point(r.org),
            dir: self.vector(r.dir),
        }
    }
}

impl Mul for Transf {
    type Output = Transf;

    // Applies `o` first and then `self`.
    fn mul(self, o: Transf) -> Transf {
        Transf {
            frd: self.frd * o.frd,
            inv: o.inv * self.inv,
        }
    }
}
