use crate::numbers::Float;
use crate::vector::{Vec3, Vec4};
use std::ops::Mul;

/// An affine matrix stored as three rows. The implicit fourth row is (0, 0, 0, 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat3x4<T: Float> {
    m: [Vec4<T>; 3],
}

impl<T: Float> Mat3x4<T> {
    pub fn from_rows(m: [Vec4<T>; 3]) -> Self {
        Mat3x4 { m }
    }

    pub fn new_identity() -> Self {
        let (o, z) = (T::one(), T::zero());
        Mat3x4 {
            m: [
                Vec4 { x: o, y: z, z: z, w: z },
                Vec4 { x: z, y: o, z: z, w: z },
                Vec4 { x: z, y: z, z: o, w: z },
            ],
        }
    }

    pub fn new_translate(trans: Vec3<T>) -> Self {
        let (o, z) = (T::one(), T::zero());
        Mat3x4 {
            m: [
                Vec4 { x: o, y: z, z: z, w: trans.x },
                Vec4 { x: z, y: o, z: z, w: trans.y },
                Vec4 { x: z, y: z, z: o, w: trans.z },
            ],
        }
    }

    pub fn new_scale(scale: Vec3<T>) -> Self {
        let z = T::zero();
        Mat3x4 {
            m: [
                Vec4 { x: scale.x, y: z, z: z, w: z },
                Vec4 { x: z, y: scale.y, z: z, w: z },
                Vec4 { x: z, y: z, z: scale.z, w: z },
            ],
        }
    }

    /// Rotation of `deg` degrees around `axis` (Rodrigues' formula).
    pub fn new_rotate(deg: T, axis: Vec3<T>) -> Self {
        let a = axis.normalize();
        let (sin, cos) = deg.to_radians().sin_cos();
        let ic = T::one() - cos;
        let z = T::zero();
        Mat3x4 {
            m: [
                Vec4 {
                    x: a.x * a.x * ic + cos,
                    y: a.x * a.y * ic - a.z * sin,
                    z: a.x * a.z * ic + a.y * sin,
                    w: z,
                },
                Vec4 {
                    x: a.y * a.x * ic + a.z * sin,
                    y: a.y * a.y * ic + cos,
                    z: a.y * a.z * ic - a.x * sin,
                    w: z,
                },
                Vec4 {
                    x: a.z * a.x * ic - a.y * sin,
                    y: a.z * a.y * ic + a.x * sin,
                    z: a.z * a.z * ic + cos,
                    w: z,
                },
            ],
        }
    }

    pub fn get(&self, r: usize, c: usize) -> T {
        self.m[r][c]
    }

    /// Transposes the linear (3x3) part. The translation is dropped, which is all
    /// that is needed when the result is only used to transform normals.
    pub fn transpose_linear(&self) -> Self {
        let m = &self.m;
        let z = T::zero();
        Mat3x4 {
            m: [
                Vec4 { x: m[0].x, y: m[1].x, z: m[2].x, w: z },
                Vec4 { x: m[0].y, y: m[1].y, z: m[2].y, w: z },
                Vec4 { x: m[0].z, y: m[1].z, z: m[2].z, w: z },
            ],
        }
    }

    /// Calculates the inverse of the affine matrix. Because the linear part can be
    /// singular, it returns an option.
    pub fn inverse(&self) -> Option<Self> {
        let g = |r: usize, c: usize| self.m[r][c];

        let c00 = g(1, 1) * g(2, 2) - g(1, 2) * g(2, 1);
        let c01 = g(1, 2) * g(2, 0) - g(1, 0) * g(2, 2);
        let c02 = g(1, 0) * g(2, 1) - g(1, 1) * g(2, 0);

        let det = g(0, 0) * c00 + g(0, 1) * c01 + g(0, 2) * c02;
        if det == T::zero() {
            return None;
        }
        let inv_det = T::one() / det;

        // Inverse of the linear part (adjugate / det):
        let a = [
            [
                c00 * inv_det,
                (g(0, 2) * g(2, 1) - g(0, 1) * g(2, 2)) * inv_det,
                (g(0, 1) * g(1, 2) - g(0, 2) * g(1, 1)) * inv_det,
            ],
            [
                c01 * inv_det,
                (g(0, 0) * g(2, 2) - g(0, 2) * g(2, 0)) * inv_det,
                (g(0, 2) * g(1, 0) - g(0, 0) * g(1, 2)) * inv_det,
            ],
            [
                c02 * inv_det,
                (g(0, 1) * g(2, 0) - g(0, 0) * g(2, 1)) * inv_det,
                (g(0, 0) * g(1, 1) - g(0, 1) * g(1, 0)) * inv_det,
            ],
        ];

        // And the translation becomes -A^-1 * t:
        let t = Vec3::new(g(0, 3), g(1, 3), g(2, 3));
        let row = |r: usize| {
            let lin = Vec3::new(a[r][0], a[r][1], a[r][2]);
            Vec4::from_vec3(lin, -lin.dot(t))
        };

        Some(Mat3x4 {
            m: [row(0), row(1), row(2)],
        })
    }

    /// Multiplies a point (w = 1).
    pub fn mul_vec_one(&self, v: Vec3<T>) -> Vec3<T> {
        Vec3 {
            x: self.m[0].dot_one(v),
            y: self.m[1].dot_one(v),
            z: self.m[2].dot_one(v),
        }
    }

    /// Multiplies a direction (w = 0).
    pub fn mul_vec_zero(&self, v: Vec3<T>) -> Vec3<T> {
        Vec3 {
            x: self.m[0].dot_zero(v),
            y: self.m[1].dot_zero(v),
            z: self.m[2].dot_zero(v),
        }
    }
}

impl<T: Float> Mul for Mat3x4<T> {
    type Output = Self;

    fn mul(self, o: Self) -> Self {
        let g = |r: usize, c: usize| self.m[r][c];
        let h = |r: usize, c: usize| o.m[r][c];
        let row = |r: usize| Vec4 {
            x: g(r, 0) * h(0, 0) + g(r, 1) * h(1, 0) + g(r, 2) * h(2, 0),
            y: g(r, 0) * h(0, 1) + g(r, 1) * h(1, 1) + g(r, 2) * h(2, 1),
            z: g(r, 0) * h(0, 2) + g(r, 1) * h(1, 2) + g(r, 2) * h(2, 2),
            w: g(r, 0) * h(0, 3) + g(r, 1) * h(1, 3) + g(r, 2) * h(2, 3) + g(r, 3),
        };
        Mat3x4 {
            m: [row(0), row(1), row(2)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3<f64>, b: Vec3<f64>) -> bool {
        (a - b).length() < 1e-12
    }

    #[test]
    fn inverse_undoes_affine() {
        let m = Mat3x4::new_translate(Vec3::new(1.0, -2.0, 3.0))
            * Mat3x4::new_rotate(30.0, Vec3::new(0.0, 1.0, 1.0))
            * Mat3x4::new_scale(Vec3::new(2.0, 0.5, 4.0));
        let inv = m.inverse().unwrap();
        let p = Vec3::new(0.3, 0.7, -1.1);
        assert!(close(inv.mul_vec_one(m.mul_vec_one(p)), p));
        assert!(close(inv.mul_vec_zero(m.mul_vec_zero(p)), p));
    }

    #[test]
    fn singular_has_no_inverse() {
        let m = Mat3x4::new_scale(Vec3::new(1.0, 0.0, 1.0));
        assert!(m.inverse().is_none());
    }
}
