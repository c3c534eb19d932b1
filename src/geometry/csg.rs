use crate::geometry::{closest_intersection, IntersectionSet, Surface, SurfaceHandle};
use pmath::ray::Ray;
use pmath::vector::Vec3;
use pmath::{max, min};

use log::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsgOp {
    Union,
    Difference,
    Intersection,
}

/// A boolean combination of two solids. The children are shared, not owned.
pub struct Csg {
    pub op: CsgOp,
    pub a: SurfaceHandle,
    pub b: SurfaceHandle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn new(min: f64, max: f64) -> Self {
        Interval { min, max }
    }

    pub fn len(self) -> f64 {
        self.max - self.min
    }

    pub fn is_degenerate(self, eps: f64) -> bool {
        self.len() <= eps
    }
}

/// The span a ray spends between the first and last boundary crossing of a set.
pub fn interval(set: &IntersectionSet) -> Option<Interval> {
    set.bounds().map(|(min, max)| Interval { min, max })
}

/// A - B in terms of intervals: the piece of `a` before `b` starts, and the piece of
/// `a` after `b` ends. Either one may be degenerate.
pub fn interval_difference(a: Interval, b: Interval) -> (Interval, Interval) {
    let before = Interval::new(a.min, min(b.min, a.max));
    let after = Interval::new(max(b.max, a.min), a.max);
    (before, after)
}

/// The overlap of two intervals (degenerate when there is none).
pub fn interval_intersection(a: Interval, b: Interval) -> Interval {
    Interval::new(max(a.min, b.min), min(a.max, b.max))
}

impl Csg {
    pub fn new(op: CsgOp, a: SurfaceHandle, b: SurfaceHandle) -> Self {
        Csg { op, a, b }
    }

    /// Intersects the (already local) ray with the combination. `owner` is the
    /// surface holding this node; it tags the result when nothing is hit.
    ///
    /// Nothing here is stored on the node, so many threads can evaluate it at once.
    pub fn intersect<'a>(&'a self, owner: &'a Surface, ray: Ray<f64>, eps: f64) -> IntersectionSet<'a> {
        match self.op {
            CsgOp::Union => closest_intersection(ray, vec![&*self.a, &*self.b], eps)
                .unwrap_or_else(|| IntersectionSet::new(owner)),
            CsgOp::Intersection => self.intersect_intersection(owner, ray, eps),
            CsgOp::Difference => self.intersect_difference(owner, ray, eps),
        }
    }

    fn intersect_intersection<'a>(&'a self, owner: &'a Surface, ray: Ray<f64>, eps: f64) -> IntersectionSet<'a> {
        let a = self.a.intersect(ray, eps);
        let b = self.b.intersect(ray, eps);

        let (ia, ib) = match (interval(&a), interval(&b)) {
            (Some(ia), Some(ib)) => (ia, ib),
            _ => return IntersectionSet::new(owner),
        };

        let overlap = interval_intersection(ia, ib);
        if overlap.is_degenerate(eps) {
            return IntersectionSet::new(owner);
        }

        // Ties go to A. The near bound of the overlap lies on the other child, so the
        // tagged primitive's normal there is only an approximation.
        let tagged = if ib.min < ia.min { &b } else { &a };
        tagged.with_hits(&[overlap.min, overlap.max], tagged.is_inverted())
    }

    fn intersect_difference<'a>(&'a self, owner: &'a Surface, ray: Ray<f64>, eps: f64) -> IntersectionSet<'a> {
        let a = self.a.intersect(ray, eps);
        let ia = match interval(&a) {
            Some(ia) => ia,
            _ => return IntersectionSet::new(owner),
        };

        let b = self.b.intersect(ray, eps);
        let ib = match interval(&b) {
            Some(ib) => ib,
            _ => return a,
        };

        // B is entirely before or after A along the ray:
        if ib.max <= ia.min || ib.min >= ia.max {
            return a;
        }

        let (before, after) = interval_difference(ia, ib);
        match (before.is_degenerate(eps), after.is_degenerate(eps)) {
            (false, true) => a.with_hits(&[before.min, before.max], a.is_inverted()),
            // The visible part is the inside of B, so its normal has to point inward:
            (true, false) => b.with_hits(&[after.min, after.max], !b.is_inverted()),
            (false, false) => {
                trace!(
                    "'{}' - '{}' splits into [{}, {}] and [{}, {}]",
                    self.a.name,
                    self.b.name,
                    before.min,
                    before.max,
                    after.min,
                    after.max
                );
                a.with_hits(
                    &[before.min, before.max, after.min, after.max],
                    a.is_inverted(),
                )
            }
            (true, true) => IntersectionSet::new(owner),
        }
    }

    pub fn inside(&self, p: Vec3<f64>) -> bool {
        match self.op {
            CsgOp::Union => self.a.inside(p) || self.b.inside(p),
            CsgOp::Intersection => self.a.inside(p) && self.b.inside(p),
            CsgOp::Difference => self.a.inside(p) && !self.b.inside(p),
        }
    }

    /// Hits are always tagged with a child, so this is only a fallback for points
    /// asked about directly.
    pub fn normal(&self, p: Vec3<f64>) -> Vec3<f64> {
        match self.op {
            CsgOp::Difference if self.b.inside(p) => -self.b.normal_at(p),
            CsgOp::Union if !self.a.inside(p) => self.b.normal_at(p),
            _ => self.a.normal_at(p),
        }
    }
}
