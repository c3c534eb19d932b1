use pmath::ray::Ray;
use pmath::vector::{Vec2, Vec3};

pub trait Camera: Send + Sync {
    /// Generates the ray through the (sub)pixel coordinate `(x, y)` of an image with
    /// the given width and height. `y` grows upward.
    fn ray_at(&self, x: f64, y: f64, width: usize, height: usize) -> Ray<f64>;
}

/// The ray for subsample `sub` of pixel `pixel`, with `ss` subsamples along each axis.
/// Rows are counted from the top, so the row is flipped before going to the camera.
pub fn subpixel_ray(
    camera: &dyn Camera,
    res: Vec2<usize>,
    ss: Vec2<usize>,
    pixel: Vec2<usize>,
    sub: Vec2<usize>,
) -> Ray<f64> {
    let x = pixel.x as f64 + (sub.x as f64) / (ss.x as f64);
    let y = pixel.y as f64 + (sub.y as f64) / (ss.y as f64);
    camera.ray_at(x, res.y as f64 - y, res.x, res.y)
}

/// A pinhole camera: every ray starts at `location` and goes through a point on a
/// projection window `focal_length` in front of it.
#[derive(Clone, Copy, Debug)]
pub struct PinholeCamera {
    location: Vec3<f64>,
    // Camera frame. The camera looks down -w.
    u: Vec3<f64>,
    v: Vec3<f64>,
    w: Vec3<f64>,
    projection: Vec2<f64>,
    focal_length: f64,
}

impl PinholeCamera {
    /// # Arguments
    /// * `location` - Where the camera is in world space.
    /// * `view_dir` - The direction the camera looks in.
    /// * `up` - Roughly which way is up (it doesn't have to be orthogonal to `view_dir`).
    /// * `projection` - Width and height of the projection window.
    /// * `focal_length` - Distance from the location to the projection window.
    pub fn new(
        location: Vec3<f64>,
        view_dir: Vec3<f64>,
        up: Vec3<f64>,
        projection: Vec2<f64>,
        focal_length: f64,
    ) -> Self {
        let w = (-view_dir).normalize();
        let u = up.cross(w).normalize();
        let v = w.cross(u);
        PinholeCamera {
            location,
            u,
            v,
            w,
            projection,
            focal_length,
        }
    }
}

// Maps [0, dim - 1] onto [-size / 2, size / 2]:
fn window_coord(pos: f64, dim: usize, size: f64) -> f64 {
    let span = if dim > 1 { (dim - 1) as f64 } else { 1. };
    size * (pos / span) - size * 0.5
}

impl Camera for PinholeCamera {
    fn ray_at(&self, x: f64, y: f64, width: usize, height: usize) -> Ray<f64> {
        let p = window_coord(x, width, self.projection.x);
        let q = window_coord(y, height, self.projection.y);
        let r = -self.focal_length;

        let dir = self.u.scale(p) + self.v.scale(q) + self.w.scale(r);
        Ray::new(self.location, dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PinholeCamera {
        PinholeCamera::new(
            Vec3::new(0., 0., 5.),
            Vec3::new(0., 0., -1.),
            Vec3::new(0., 1., 0.),
            Vec2 { x: 2., y: 2. },
            1.,
        )
    }

    #[test]
    fn center_looks_down_view_dir() {
        let ray = camera().ray_at(5., 5., 11, 11);
        assert_eq!(ray.org, Vec3::new(0., 0., 5.));
        assert!((ray.dir - Vec3::new(0., 0., -1.)).length() < 1e-12);
    }

    #[test]
    fn corners_span_the_window() {
        let cam = camera();
        let low = cam.ray_at(0., 0., 11, 11);
        let high = cam.ray_at(10., 10., 11, 11);
        assert!((low.dir - Vec3::new(-1., -1., -1.)).length() < 1e-12);
        assert!((high.dir - Vec3::new(1., 1., -1.)).length() < 1e-12);
    }

    #[test]
    fn top_row_points_up() {
        let res = Vec2 { x: 4, y: 4 };
        let ss = Vec2 { x: 1, y: 1 };
        let top = subpixel_ray(&camera(), res, ss, Vec2 { x: 1, y: 0 }, Vec2 { x: 0, y: 0 });
        let bottom = subpixel_ray(&camera(), res, ss, Vec2 { x: 1, y: 3 }, Vec2 { x: 0, y: 0 });
        assert!(top.dir.y > bottom.dir.y);
    }
}
