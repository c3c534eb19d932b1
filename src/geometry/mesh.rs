use crate::geometry::triangle::Triangle;
use pmath::ray::Ray;
use pmath::vector::Vec3;

/// A bag of triangles. There is no acceleration structure; every triangle is tested.
#[derive(Clone, Debug)]
pub struct Mesh {
    tris: Vec<Triangle>,
}

impl Mesh {
    pub fn new(tris: Vec<Triangle>) -> Self {
        Mesh { tris }
    }

    /// Builds a mesh from a vertex list and triangle indices.
    pub fn from_indexed(verts: &[Vec3<f64>], indices: &[[usize; 3]]) -> Option<Self> {
        let mut tris = Vec::with_capacity(indices.len());
        for idx in indices {
            tris.push(Triangle::new(
                *verts.get(idx[0])?,
                *verts.get(idx[1])?,
                *verts.get(idx[2])?,
            ));
        }
        Some(Mesh { tris })
    }

    pub fn num_tris(&self) -> usize {
        self.tris.len()
    }

    /// Calls `hit` with the distance of every triangle the ray crosses.
    pub fn intersect<F: FnMut(f64)>(&self, ray: Ray<f64>, eps: f64, mut hit: F) {
        for tri in self.tris.iter() {
            if let Some(t) = tri.intersect(ray, eps) {
                hit(t);
            }
        }
    }

    /// Normal of the triangle whose plane lies closest to `p`.
    pub fn normal(&self, p: Vec3<f64>) -> Vec3<f64> {
        let mut best = (std::f64::INFINITY, Vec3::zero());
        for tri in self.tris.iter() {
            let dist = tri.plane_dist(p);
            if dist < best.0 {
                best = (dist, tri.normal());
            }
        }
        best.1
    }
}
