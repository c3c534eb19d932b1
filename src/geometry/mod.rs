pub mod csg;
pub mod mesh;
pub mod plane;
pub mod sphere;
pub mod triangle;

use crate::geometry::csg::Csg;
use crate::geometry::mesh::Mesh;
use crate::geometry::plane::Plane;
use crate::geometry::sphere::Sphere;
use crate::geometry::triangle::Triangle;
use crate::material::Material;
use crate::transform::Transf;
use pmath::ray::Ray;
use pmath::vector::Vec3;

use arrayvec::ArrayVec;
use log::warn;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The most hit distances a single intersection set keeps. When more are found, the
/// nearest ones win and the set is marked as truncated. Meshes used as CSG children
/// should stay within this many crossings, or their intervals come out too short.
pub const MAX_HITS: usize = 8;

// Truncation is logged once per process, not once per ray:
static TRUNCATION_LOGGED: AtomicBool = AtomicBool::new(false);

/// Surfaces are shared between the scene, CSG nodes and worker threads.
pub type SurfaceHandle = Arc<Surface>;

pub enum Shape {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    Mesh(Mesh),
    Csg(Csg),
}

/// A named piece of geometry placed in the scene with its own transformation.
pub struct Surface {
    pub name: String,
    pub shape: Shape,
    /// Goes from the surface's local space to its parent's space (world space for
    /// top level surfaces).
    pub transf: Transf,
    pub material: Material,
}

// Geometric interaction:
#[derive(Clone, Copy, Debug)]
pub struct Interaction {
    pub p: Vec3<f64>,  // intersection point
    pub n: Vec3<f64>,  // unit normal, already flipped for inverted hits
    pub wo: Vec3<f64>, // unit direction leaving the point, toward the ray origin
    pub t: f64,        // the t value of the intersection of the ray
}

impl Surface {
    pub fn new(name: &str, shape: Shape, transf: Transf, material: Material) -> Self {
        Surface {
            name: name.to_owned(),
            shape,
            transf,
            material,
        }
    }

    pub fn into_handle(self) -> SurfaceHandle {
        Arc::new(self)
    }

    /// Calculates every place the ray (in the parent's space) crosses the surface's boundary.
    pub fn intersect(&self, ray: Ray<f64>, eps: f64) -> IntersectionSet {
        let local = self.transf.inverse().ray(ray);
        match &self.shape {
            Shape::Sphere(s) => {
                let mut set = IntersectionSet::new(self);
                if let Some((t0, t1)) = s.intersect(local) {
                    set.insert(t0);
                    set.insert(t1);
                }
                set
            }
            Shape::Plane(p) => {
                let mut set = IntersectionSet::new(self);
                if let Some(t) = p.intersect(local, eps) {
                    set.insert(t);
                }
                set
            }
            Shape::Triangle(tri) => {
                let mut set = IntersectionSet::new(self);
                if let Some(t) = tri.intersect(local, eps) {
                    set.insert(t);
                }
                set
            }
            Shape::Mesh(m) => {
                let mut set = IntersectionSet::new(self);
                m.intersect(local, eps, |t| set.insert(t));
                set
            }
            // The children report in this node's local space, so move them up one level:
            Shape::Csg(c) => c.intersect(self, local, eps).reparent(self.transf),
        }
    }

    /// Whether or not a point (in the parent's space) lies inside of the solid. Open
    /// surfaces (triangles and meshes) have no inside.
    pub fn inside(&self, p: Vec3<f64>) -> bool {
        let local = self.transf.inverse().point(p);
        match &self.shape {
            Shape::Sphere(s) => s.inside(local),
            Shape::Plane(pl) => pl.inside(local),
            Shape::Triangle(_) | Shape::Mesh(_) => false,
            Shape::Csg(c) => c.inside(local),
        }
    }

    /// The unit normal at a point (in the parent's space) on the surface.
    pub fn normal_at(&self, p: Vec3<f64>) -> Vec3<f64> {
        let local = self.transf.inverse().point(p);
        let n = match &self.shape {
            Shape::Sphere(s) => s.normal(local),
            Shape::Plane(pl) => pl.normal(),
            Shape::Triangle(tri) => tri.normal(),
            Shape::Mesh(m) => m.normal(local),
            // A CSG hit is always reported by one of its primitives, so this is only
            // reached when someone asks the node directly:
            Shape::Csg(c) => return self.transf.normal(c.normal(local)).normalize(),
        };
        self.transf.normal(n).normalize()
    }
}

/// The ascending hit distances of one ray against one surface.
///
/// `surface` is the primitive that produced the hits (for CSG nodes this is one of
/// the children), `parent` takes points from that primitive's parent space to world
/// space, and `inverted` flips the primitive's normal (the inside of a subtracted
/// solid). Distances can be negative or tiny; only the ones above epsilon are hits.
#[derive(Clone)]
pub struct IntersectionSet<'a> {
    surface: &'a Surface,
    parent: Transf,
    inverted: bool,
    truncated: bool,
    hits: ArrayVec<[f64; MAX_HITS]>,
}

impl<'a> IntersectionSet<'a> {
    pub fn new(surface: &'a Surface) -> Self {
        IntersectionSet {
            surface,
            parent: Transf::new_identity(),
            inverted: false,
            truncated: false,
            hits: ArrayVec::new(),
        }
    }

    /// A set reporting the same primitive as `self` but with different distances.
    pub fn with_hits(&self, hits: &[f64], inverted: bool) -> Self {
        let mut set = IntersectionSet {
            surface: self.surface,
            parent: self.parent,
            inverted,
            truncated: self.truncated,
            hits: ArrayVec::new(),
        };
        for &t in hits {
            set.insert(t);
        }
        set
    }

    /// Inserts a distance keeping the set sorted. When the set is full the farthest
    /// distance is dropped.
    pub fn insert(&mut self, t: f64) {
        if t.is_nan() {
            return;
        }
        if self.hits.is_full() {
            self.truncate();
            match self.hits.last() {
                Some(&last) if t < last => {
                    self.hits.pop();
                }
                _ => return,
            }
        }
        let pos = self.hits.iter().position(|&h| h > t).unwrap_or(self.hits.len());
        self.hits.insert(pos, t);
    }

    fn truncate(&mut self) {
        self.truncated = true;
        if !TRUNCATION_LOGGED.swap(true, Ordering::Relaxed) {
            warn!(
                "'{}' is crossed more than {} times by one ray, dropping the farthest hits",
                self.surface.name, MAX_HITS
            );
        }
    }

    fn reparent(mut self, transf: Transf) -> Self {
        self.parent = transf * self.parent;
        self
    }

    pub fn surface(&self) -> &'a Surface {
        self.surface
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn hits(&self) -> &[f64] {
        &self.hits
    }

    /// Whether some far hits were dropped because the set was full.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// No distances at all, not even behind the origin.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// The nearest distance greater than `eps`.
    pub fn closest(&self, eps: f64) -> Option<f64> {
        self.hits.iter().copied().find(|&t| t > eps)
    }

    /// Smallest and largest distance, if there are any.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        match (self.hits.first(), self.hits.last()) {
            (Some(&min), Some(&max)) => Some((min, max)),
            _ => None,
        }
    }

    /// Calculates the interaction at distance `t` of the (world space) `ray` that
    /// produced this set.
    pub fn interaction(&self, ray: Ray<f64>, t: f64) -> Interaction {
        let p = ray.point_at(t);
        let local = self.parent.inverse().point(p);
        let wo = (-ray.dir).normalize();
        let n = self.parent.normal(self.surface.normal_at(local)).normalize();
        let n = if self.inverted { -n } else { n };
        Interaction {
            p,
            // A degenerate point (the center of a sphere) has no normal; face the viewer.
            n: if n.length2() == 0. { wo } else { n },
            wo,
            t,
        }
    }
}

/// Returns the set of the surface with the nearest hit above `eps`, or `None` if the ray
/// misses all of them.
pub fn closest_intersection<'a, I>(ray: Ray<f64>, surfaces: I, eps: f64) -> Option<IntersectionSet<'a>>
where
    I: IntoIterator<Item = &'a Surface>,
{
    let mut best: Option<(f64, IntersectionSet<'a>)> = None;
    for surface in surfaces {
        let set = surface.intersect(ray, eps);
        let t = match set.closest(eps) {
            Some(t) => t,
            _ => continue,
        };
        match &best {
            Some((best_t, _)) if *best_t <= t => (),
            _ => best = Some((t, set)),
        }
    }
    best.map(|(_, set)| set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spectrum::Color;

    fn unit_sphere() -> Surface {
        Surface::new(
            "sphere",
            Shape::Sphere(Sphere::new(1.)),
            Transf::new_identity(),
            Material::diffuse(Color::white()),
        )
    }

    #[test]
    fn set_stays_sorted_and_keeps_nearest() {
        let surface = unit_sphere();
        let mut set = IntersectionSet::new(&surface);
        for i in (0..MAX_HITS + 3).rev() {
            set.insert(i as f64);
        }
        assert_eq!(set.hits().len(), MAX_HITS);
        assert_eq!(set.hits()[0], 0.);
        assert_eq!(set.hits()[MAX_HITS - 1], (MAX_HITS - 1) as f64);
        assert!(set.is_truncated());
        assert!(set.with_hits(&[1.], false).is_truncated());
    }

    #[test]
    fn full_set_is_not_truncated() {
        let surface = unit_sphere();
        let mut set = IntersectionSet::new(&surface);
        for i in 0..MAX_HITS {
            set.insert(i as f64);
        }
        assert_eq!(set.hits().len(), MAX_HITS);
        assert!(!set.is_truncated());
    }

    #[test]
    fn closest_skips_epsilon() {
        let surface = unit_sphere();
        let set = IntersectionSet::new(&surface).with_hits(&[-1., 1e-9, 0.5], false);
        assert_eq!(set.closest(1e-7), Some(0.5));
    }

    #[test]
    fn closest_intersection_picks_nearest_surface() {
        let near = Surface::new(
            "near",
            Shape::Sphere(Sphere::new(1.)),
            Transf::new_translate(Vec3::new(0., 0., 2.)),
            Material::diffuse(Color::white()),
        );
        let far = unit_sphere();
        let ray = Ray::new(Vec3::new(0., 0., 10.), Vec3::new(0., 0., -1.));
        let set = closest_intersection(ray, vec![&far, &near], 1e-7).unwrap();
        assert_eq!(set.surface().name, "near");
        assert!((set.closest(1e-7).unwrap() - 7.).abs() < 1e-10);
    }

    #[test]
    fn miss_is_empty() {
        let surface = unit_sphere();
        let ray = Ray::new(Vec3::new(0., 5., 5.), Vec3::new(0., 0., -1.));
        assert!(surface.intersect(ray, 1e-7).is_empty());
    }

    #[test]
    fn translated_sphere_normal_points_out() {
        let surface = Surface::new(
            "moved",
            Shape::Sphere(Sphere::new(1.)),
            Transf::new_translate(Vec3::new(3., 0., 0.)),
            Material::diffuse(Color::white()),
        );
        let n = surface.normal_at(Vec3::new(4., 0., 0.));
        assert!((n - Vec3::new(1., 0., 0.)).length() < 1e-12);
    }
}
