use crate::spectrum::Color;
use pmath::numbers::Float;
use pmath::vector::Vec2;

use simple_error::{bail, SimpleError, SimpleResult};

/// Everything that controls a single render. It is built once and then only ever
/// passed around by reference.
#[derive(Clone, Copy, Debug)]
pub struct RenderConfig {
    /// Resolution of the final image, in pixels.
    pub res: Vec2<usize>,
    /// Number of subsamples along each axis of a pixel.
    pub supersample: Vec2<usize>,
    /// The number of worker threads tracing rays.
    pub num_threads: usize,
    /// Whether or not to pin the worker threads to cores.
    pub bind_threads: bool,
    /// Distances at or below this are not hits (self intersections, degenerate intervals).
    pub epsilon: f64,
    /// Global switch for shadow rays.
    pub enable_shadows: bool,
    /// Precompute every candidate's rank for the whole frame before tracing.
    pub rank_cache: bool,
    /// Color used when a ray hits nothing (or its task failed).
    pub background: Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            res: Vec2 { x: 100, y: 100 },
            supersample: Vec2 { x: 1, y: 1 },
            num_threads: 10,
            bind_threads: false,
            epsilon: f64::SELF_INT_COMP,
            enable_shadows: true,
            rank_cache: false,
            background: Color::black(),
        }
    }
}

impl RenderConfig {
    /// Number of samples that make up one pixel.
    pub fn samples_per_pixel(&self) -> usize {
        self.supersample.product()
    }

    /// Checks the configuration before any work is scheduled.
    pub fn validate(&self) -> SimpleResult<()> {
        if self.res.x == 0 || self.res.y == 0 {
            return Err(SimpleError::new(format!(
                "Resolution must be non-zero, got {}x{}.",
                self.res.x, self.res.y
            )));
        }
        if self.supersample.x == 0 || self.supersample.y == 0 {
            return Err(SimpleError::new(format!(
                "Supersampling factors must be non-zero, got {}x{}.",
                self.supersample.x, self.supersample.y
            )));
        }
        if self.num_threads == 0 {
            bail!("Can't render with 0 threads.");
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0. {
            return Err(SimpleError::new(format!(
                "Epsilon must be finite and positive, got {}.",
                self.epsilon
            )));
        }
        Ok(())
    }
}
