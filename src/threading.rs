use crate::aggregator::LightingAggregator;
use crate::camera::{subpixel_ray, Camera};
use crate::config::RenderConfig;
use crate::film::{Image, PixelAccumulator};
use crate::scene::Scene;
use crate::spectrum::Color;
use crate::threadpool::{CancelToken, Pending, ThreadPool};
use pmath::ray::Ray;
use pmath::vector::Vec2;

use log::{debug, info, warn};
use simple_error::{bail, SimpleError, SimpleResult};

use std::sync::Arc;
use std::time::Instant;

/// Gets told every time a batch of pixels is done.
pub trait ProgressMonitor {
    fn increment(&self);
    /// How many finished pixels make up one increment.
    fn increment_size(&self) -> usize;
}

/// A monitor that doesn't monitor.
pub struct NoProgress;

impl ProgressMonitor for NoProgress {
    fn increment(&self) {}

    fn increment_size(&self) -> usize {
        usize::max_value()
    }
}

/// One subsample: its ray and its index into the subsample grid
/// (`y * (width * ssw) + x`).
#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub ray: Ray<f64>,
    pub position: usize,
}

/// Anything that can turn a sample into a color. `None` means nothing was hit.
pub trait ColorSource: Send + Sync {
    fn color_at(&self, sample: &Sample) -> SimpleResult<Option<Color>>;
}

/// Renders scenes by farming out one task per subsample to a worker pool.
pub struct Tracer {
    config: RenderConfig,
}

impl Tracer {
    pub fn new(config: RenderConfig) -> Self {
        Tracer { config }
    }

    /// Renders the scene with its camera.
    ///
    /// Fails before anything is scheduled if the configuration is invalid or the scene
    /// has no camera, and after all tasks have resolved if `cancel` was set.
    pub fn render(&self, scene: &Scene, progress: &dyn ProgressMonitor, cancel: &CancelToken) -> SimpleResult<Image> {
        self.config.validate()?;
        let camera = match &scene.camera {
            Some(camera) => camera.clone(),
            None => return Err(SimpleError::new("Scene has no camera to render from.")),
        };

        let res = self.config.res;
        let ss = self.config.supersample;
        info!(
            "Rendering {}x{} ({}x{} samples per pixel) with {} surfaces and {} lights",
            res.x,
            res.y,
            ss.x,
            ss.y,
            scene.surfaces.len(),
            scene.lights.len()
        );
        let start = Instant::now();

        let mut aggregator = LightingAggregator::new(scene, &self.config);
        if self.config.rank_cache {
            aggregator.set_dimensions(&*camera, res.x, res.y, ss.x, ss.y);
            aggregator.init_rank_cache()?;
        }

        let image = self.trace(&*camera, Arc::new(aggregator), progress, cancel)?;
        info!("Finished rendering in {:?}", start.elapsed());
        Ok(image)
    }

    /// Traces every subsample of every pixel through `source` and averages them.
    ///
    /// Misses and failed tasks get the background color. The samples of a pixel are
    /// summed in submission order, so the result doesn't depend on which worker finished
    /// first.
    pub fn trace(
        &self,
        camera: &dyn Camera,
        source: Arc<dyn ColorSource>,
        progress: &dyn ProgressMonitor,
        cancel: &CancelToken,
    ) -> SimpleResult<Image> {
        self.config.validate()?;
        let res = self.config.res;
        let ss = self.config.supersample;
        let background = self.config.background;
        let row_len = res.x * ss.x;

        let pool = ThreadPool::new(self.config.num_threads, self.config.bind_threads)?;
        debug!(
            "Tracing {} samples on {} threads",
            res.product() * self.config.samples_per_pixel(),
            pool.num_threads()
        );

        //
        // Submit one task per subsample:
        //

        let mut pending: Vec<Vec<Pending<Option<Color>>>> = Vec::with_capacity(res.product());
        'submit: for j in 0..res.y {
            for i in 0..res.x {
                let mut samples = Vec::with_capacity(self.config.samples_per_pixel());
                for l in 0..ss.y {
                    for k in 0..ss.x {
                        if cancel.is_cancelled() {
                            pending.push(samples);
                            break 'submit;
                        }
                        let pixel = Vec2 { x: i, y: j };
                        let sub = Vec2 { x: k, y: l };
                        let sample = Sample {
                            ray: subpixel_ray(camera, res, ss, pixel, sub),
                            position: (j * ss.y + l) * row_len + (i * ss.x + k),
                        };
                        let source = source.clone();
                        samples.push(pool.submit(cancel, move || source.color_at(&sample)));
                    }
                }
                pending.push(samples);
            }
        }

        //
        // Accumulate (every pending handle is waited on, even when cancelled):
        //

        let increment_size = pmath::max(progress.increment_size(), 1);
        let mut pixels = Vec::with_capacity(res.product());
        for (index, samples) in pending.into_iter().enumerate() {
            let mut pixel = PixelAccumulator::black();
            for sample in samples {
                let color = match sample.wait() {
                    Ok(Some(color)) => color,
                    Ok(None) => background,
                    Err(e) => {
                        if !cancel.is_cancelled() {
                            warn!("Sample of pixel {} failed: {}", index, e);
                        }
                        background
                    }
                };
                pixel = pixel.add_sample(color);
            }
            pixels.push(pixel.final_color());

            if (index + 1) % increment_size == 0 {
                progress.increment();
            }
        }

        if cancel.is_cancelled() {
            bail!("Render was cancelled.");
        }

        Ok(Image::new(res, pixels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PinholeCamera;
    use pmath::vector::Vec3;

    use test_log::test;

    use std::cell::Cell;

    fn camera() -> PinholeCamera {
        PinholeCamera::new(
            Vec3::zero(),
            Vec3::new(0., 0., -1.),
            Vec3::new(0., 1., 0.),
            Vec2 { x: 1., y: 1. },
            1.,
        )
    }

    fn config(res: usize, ss: usize, num_threads: usize) -> RenderConfig {
        RenderConfig {
            res: Vec2 { x: res, y: res },
            supersample: Vec2 { x: ss, y: ss },
            num_threads,
            background: Color::new(0.5, 0., 0.5),
            ..RenderConfig::default()
        }
    }

    // Gives every subsample of a pixel its own color, keyed by position:
    struct ByPosition(Vec<Color>);

    impl ColorSource for ByPosition {
        fn color_at(&self, sample: &Sample) -> SimpleResult<Option<Color>> {
            Ok(self.0.get(sample.position).copied())
        }
    }

    struct Counter {
        count: Cell<usize>,
        size: usize,
    }

    impl ProgressMonitor for Counter {
        fn increment(&self) {
            self.count.set(self.count.get() + 1);
        }

        fn increment_size(&self) -> usize {
            self.size
        }
    }

    #[test]
    fn supersamples_are_averaged_exactly() {
        let c = [
            Color::new(0.1, 0.7, 0.3),
            Color::new(0.9, 0.2, 0.4),
            Color::new(0.35, 0.15, 1.0),
            Color::new(0.05, 0.6, 0.0),
        ];
        let tracer = Tracer::new(config(1, 2, 3));
        let image = tracer
            .trace(&camera(), Arc::new(ByPosition(c.to_vec())), &NoProgress, &CancelToken::new())
            .unwrap();

        let expected = (c[0] + c[1] + c[2] + c[3]).div_scale(4.);
        assert_eq!(image.get(0, 0), Some(expected));
    }

    #[test]
    fn misses_become_background() {
        let tracer = Tracer::new(config(2, 1, 2));
        // Only the first pixel gets a color:
        let image = tracer
            .trace(&camera(), Arc::new(ByPosition(vec![Color::white()])), &NoProgress, &CancelToken::new())
            .unwrap();
        assert_eq!(image.get(0, 0), Some(Color::white()));
        assert_eq!(image.get(1, 1), Some(Color::new(0.5, 0., 0.5)));
    }

    struct Panicky;

    impl ColorSource for Panicky {
        fn color_at(&self, sample: &Sample) -> SimpleResult<Option<Color>> {
            if sample.position == 1 {
                panic!("bad sample");
            }
            Ok(Some(Color::white()))
        }
    }

    #[test]
    fn panicking_task_becomes_background() {
        let tracer = Tracer::new(config(1, 2, 2));
        let image = tracer
            .trace(&camera(), Arc::new(Panicky), &NoProgress, &CancelToken::new())
            .unwrap();
        let expected = (Color::white() + Color::new(0.5, 0., 0.5) + Color::white() + Color::white()).div_scale(4.);
        assert_eq!(image.get(0, 0), Some(expected));
    }

    #[test]
    fn progress_is_reported_in_batches() {
        let tracer = Tracer::new(config(4, 1, 2));
        let counter = Counter {
            count: Cell::new(0),
            size: 5,
        };
        tracer
            .trace(&camera(), Arc::new(ByPosition(Vec::new())), &counter, &CancelToken::new())
            .unwrap();
        // 16 pixels in batches of 5:
        assert_eq!(counter.count.get(), 3);
    }

    #[test]
    fn cancelled_trace_is_an_error() {
        let tracer = Tracer::new(config(4, 2, 2));
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = tracer.trace(&camera(), Arc::new(ByPosition(Vec::new())), &NoProgress, &cancel);
        assert!(result.is_err());
    }

    #[test]
    fn render_without_camera_fails_early() {
        let tracer = Tracer::new(config(4, 1, 2));
        let result = tracer.render(&Scene::new(), &NoProgress, &CancelToken::new());
        let err = result.unwrap_err();
        assert!(err.as_str().contains("camera"));
    }

    #[test]
    fn invalid_config_fails_early() {
        let tracer = Tracer::new(config(0, 1, 2));
        let mut scene = Scene::new();
        scene.set_camera(camera());
        assert!(tracer.render(&scene, &NoProgress, &CancelToken::new()).is_err());
    }
}
