use crate::camera::{subpixel_ray, Camera};
use crate::config::RenderConfig;
use crate::geometry::{Surface, SurfaceHandle};
use crate::scene::{LightHandle, Scene};
use crate::shading::{ShaderContext, ShadingEngine};
use crate::spectrum::Color;
use crate::threading::{ColorSource, Sample};
use crate::light::Light;
use pmath::ray::Ray;
use pmath::vector::Vec2;

use log::{debug, trace};
use once_cell::sync::OnceCell;
use simple_error::{SimpleError, SimpleResult};

use std::sync::Arc;
use std::time::Instant;

/// Rank reported by a candidate whose surface the ray misses.
pub const NO_HIT: f64 = -1.;

/// One (surface, light) pair. Ranking only intersects; shading happens only when the
/// pair wins.
pub struct LightingEngine {
    surface: SurfaceHandle,
    light: LightHandle,
    other_surfaces: Vec<SurfaceHandle>,
}

impl LightingEngine {
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn light(&self) -> &Light {
        &self.light
    }

    /// Every surface of the scene except this pair's own. These are the occluders.
    pub fn other_surfaces(&self) -> &[SurfaceHandle] {
        &self.other_surfaces
    }

    /// The nearest hit distance above `eps`, or `NO_HIT`.
    pub fn rank(&self, ray: Ray<f64>, eps: f64) -> f64 {
        self.surface.intersect(ray, eps).closest(eps).unwrap_or(NO_HIT)
    }

    /// Shades the nearest hit of the ray with this pair's light.
    pub fn shade(&self, ray: Ray<f64>, eps: f64, engine: &ShadingEngine) -> Option<Color> {
        let set = self.surface.intersect(ray, eps);
        let t = set.closest(eps)?;
        let hit = set.interaction(ray, t);

        let context = ShaderContext::new(&self.light, &self.other_surfaces, hit.p);

        Some(engine.shade(&hit, &set.surface().material, &context))
    }
}

/// Picks the candidate with the smallest rank.
///
/// Ranks below `eps` are not hits. A later candidate only replaces the current best
/// when it is closer by more than `eps`, so the first one seen wins near-ties. The
/// scan stops as soon as the best rank is `eps` or less.
///
/// Returns the index and rank of the winner.
pub fn ranked_choice<I>(ranks: I, eps: f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, rank) in ranks.into_iter().enumerate() {
        if rank < eps {
            continue;
        }
        match best {
            Some((_, best_rank)) if rank >= best_rank - eps => (),
            _ => best = Some((i, rank)),
        }
        match best {
            Some((_, best_rank)) if best_rank <= eps => break,
            _ => (),
        }
    }
    best
}

// Ranks of every candidate for every position of the kernel input, stored per candidate:
struct RankCache {
    ranks: Vec<Vec<f64>>,
}

/// Finds the nearest surface a ray hits and shades it with every light.
pub struct LightingAggregator {
    candidates: Vec<LightingEngine>,
    engine: ShadingEngine,
    epsilon: f64,
    kernel_input: Option<Vec<Ray<f64>>>,
    rank_cache: OnceCell<RankCache>,
}

impl LightingAggregator {
    /// Builds one candidate for every (surface, light) pair of the scene.
    pub fn new(scene: &Scene, config: &RenderConfig) -> Self {
        let mut candidates = Vec::with_capacity(scene.surfaces.len() * scene.lights.len());
        for (si, surface) in scene.surfaces.iter().enumerate() {
            for light in scene.lights.iter() {
                candidates.push(LightingEngine {
                    surface: surface.clone(),
                    light: light.clone(),
                    other_surfaces: except(&scene.surfaces, si),
                });
            }
        }

        LightingAggregator {
            candidates,
            engine: ShadingEngine::new(config),
            epsilon: config.epsilon,
            kernel_input: None,
            rank_cache: OnceCell::new(),
        }
    }

    pub fn candidates(&self) -> &[LightingEngine] {
        &self.candidates
    }

    /// Color of the nearest hit of `ray`, or `None` if it hits nothing.
    pub fn evaluate(&self, ray: Ray<f64>) -> Option<Color> {
        let ranks = self.candidates.iter().map(|c| c.rank(ray, self.epsilon));
        let (winner, rank) = ranked_choice(ranks, self.epsilon)?;
        self.produce(winner, rank, ray)
    }

    /// Same as `evaluate` for the ray at `position` of the kernel input, but with the
    /// ranks taken from the cache (which is built on first use).
    pub fn evaluate_at(&self, position: usize) -> SimpleResult<Option<Color>> {
        let cache = self.rank_cache()?;
        let ray = match self.kernel_input.as_ref().and_then(|rays| rays.get(position)) {
            Some(ray) => *ray,
            None => {
                return Err(SimpleError::new(format!(
                    "Position {} is outside of the kernel input.",
                    position
                )))
            }
        };

        let ranks = cache.ranks.iter().map(|r| r[position]);
        Ok(match ranked_choice(ranks, self.epsilon) {
            Some((winner, rank)) => self.produce(winner, rank, ray),
            None => None,
        })
    }

    // Shades the winner together with the other lights on the same surface:
    fn produce(&self, winner: usize, rank: f64, ray: Ray<f64>) -> Option<Color> {
        let surface = &self.candidates[winner].surface;
        trace!("'{}' wins at distance {}", surface.name, rank);

        let mut result: Option<Color> = None;
        for candidate in self.candidates.iter().filter(|c| Arc::ptr_eq(&c.surface, surface)) {
            if let Some(color) = candidate.shade(ray, self.epsilon, &self.engine) {
                result = Some(result.map_or(color, |sum| sum + color));
            }
        }
        result
    }

    /// One ray for every subsample of a `width` x `height` image (`ssw` x `ssh`
    /// subsamples per pixel), stored at `y * (width * ssw) + x`. Clears the cache.
    pub fn set_dimensions(&mut self, camera: &dyn Camera, width: usize, height: usize, ssw: usize, ssh: usize) {
        let res = Vec2 { x: width, y: height };
        let ss = Vec2 { x: ssw, y: ssh };

        let mut rays = Vec::with_capacity(res.product() * ss.product());
        for y in 0..(height * ssh) {
            for x in 0..(width * ssw) {
                let pixel = Vec2 { x: x / ssw, y: y / ssh };
                let sub = Vec2 { x: x % ssw, y: y % ssh };
                rays.push(subpixel_ray(camera, res, ss, pixel, sub));
            }
        }
        self.set_kernel_input(rays);
    }

    /// Uses an arbitrary batch of rays as the kernel input. Clears the cache.
    pub fn set_kernel_input(&mut self, rays: Vec<Ray<f64>>) {
        self.kernel_input = Some(rays);
        self.reset_rank_cache();
    }

    pub fn reset_rank_cache(&mut self) {
        self.rank_cache = OnceCell::new();
    }

    pub fn is_rank_cache_ready(&self) -> bool {
        self.rank_cache.get().is_some()
    }

    // Ranks every candidate against the whole kernel input in a single pass. Only the
    // first call does any work:
    fn rank_cache(&self) -> SimpleResult<&RankCache> {
        let rays = match &self.kernel_input {
            Some(rays) => rays,
            None => return Err(SimpleError::new("Can't build the rank cache without kernel input.")),
        };

        Ok(self.rank_cache.get_or_init(|| {
            let start = Instant::now();
            let ranks = self
                .candidates
                .iter()
                .map(|c| rays.iter().map(|&ray| c.rank(ray, self.epsilon)).collect())
                .collect();
            debug!(
                "Ranked {} candidates over {} rays in {:?}",
                self.candidates.len(),
                rays.len(),
                start.elapsed()
            );
            RankCache { ranks }
        }))
    }

    /// Builds the cache ahead of time (otherwise the first `evaluate_at` does).
    pub fn init_rank_cache(&self) -> SimpleResult<()> {
        self.rank_cache().map(|_| ())
    }
}

impl ColorSource for LightingAggregator {
    fn color_at(&self, sample: &Sample) -> SimpleResult<Option<Color>> {
        if self.is_rank_cache_ready() {
            self.evaluate_at(sample.position)
        } else {
            Ok(self.evaluate(sample.ray))
        }
    }
}

fn except<T>(items: &[Arc<T>], skip: usize) -> Vec<Arc<T>> {
    items
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != skip)
        .map(|(_, item)| item.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PinholeCamera;
    use crate::geometry::csg::{Csg, CsgOp};
    use crate::geometry::plane::Plane;
    use crate::geometry::sphere::Sphere;
    use crate::geometry::Shape;
    use crate::light::Attenuation;
    use crate::material::Material;
    use crate::transform::Transf;
    use pmath::vector::Vec3;

    use test_log::test;

    const EPS: f64 = 1e-7;

    #[test]
    fn lowest_rank_wins() {
        let (winner, rank) = ranked_choice(vec![5., 2., 2. + EPS / 2.], EPS).unwrap();
        assert_eq!(winner, 1);
        assert_eq!(rank, 2.);
    }

    #[test]
    fn first_seen_wins_near_ties() {
        let (winner, _) = ranked_choice(vec![2. + EPS / 2., 2.], EPS).unwrap();
        assert_eq!(winner, 0);
    }

    #[test]
    fn misses_and_tiny_ranks_are_skipped() {
        assert_eq!(ranked_choice(vec![NO_HIT, EPS / 10., 3.], EPS), Some((2, 3.)));
        assert_eq!(ranked_choice(vec![NO_HIT, NO_HIT], EPS), None);
        assert_eq!(ranked_choice(Vec::new(), EPS), None);
    }

    #[test]
    fn stops_at_best_possible_rank() {
        // The second rank is exactly epsilon, nothing after it is looked at:
        assert_eq!(ranked_choice(vec![4., EPS, EPS], EPS), Some((1, EPS)));
    }

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.add_surface(
            Surface::new(
                "ball",
                Shape::Sphere(Sphere::new(1.)),
                Transf::new_identity(),
                Material::diffuse(Color::new(1., 0.2, 0.2)).with_highlight(Color::white(), 16.),
            )
            .into_handle(),
        );
        let a = Surface::new(
            "a",
            Shape::Sphere(Sphere::new(1.)),
            Transf::new_identity(),
            Material::diffuse(Color::new(0.2, 1., 0.2)),
        )
        .into_handle();
        let b = Surface::new(
            "b",
            Shape::Sphere(Sphere::new(0.8)),
            Transf::new_translate(Vec3::new(0., 0., 0.8)),
            Material::diffuse(Color::new(0.2, 0.2, 1.)),
        )
        .into_handle();
        scene.add_surface(
            Surface::new(
                "bowl",
                Shape::Csg(Csg::new(CsgOp::Difference, a, b)),
                Transf::new_translate(Vec3::new(2.5, 0., 0.)),
                Material::diffuse(Color::white()),
            )
            .into_handle(),
        );
        scene.add_surface(
            Surface::new(
                "floor",
                Shape::Plane(Plane::new()),
                Transf::new_translate(Vec3::new(0., 0., -1.)),
                Material::diffuse(Color::from_scalar(0.7)),
            )
            .into_handle(),
        );
        scene.add_light(Light::point(
            Vec3::new(2., 3., 6.),
            Attenuation { a: 0.01, b: 0.1, c: 1. },
            Color::white(),
            1.5,
        ));
        scene.add_light(Light::ambient(Color::white(), 0.1));
        scene.set_camera(PinholeCamera::new(
            Vec3::new(1., -6., 3.),
            Vec3::new(0., 6., -3.),
            Vec3::new(0., 0., 1.),
            Vec2 { x: 2., y: 1.5 },
            1.,
        ));
        scene
    }

    #[test]
    fn one_candidate_per_pair() {
        let scene = scene();
        let agg = LightingAggregator::new(&scene, &RenderConfig::default());
        assert_eq!(agg.candidates().len(), 6);
        assert_eq!(agg.candidates()[0].surface().name, "ball");
        assert_eq!(agg.candidates()[0].light().intensity, 1.5);
    }

    #[test]
    fn candidates_are_shadowed_by_other_surfaces_only() {
        let mut scene = Scene::new();
        scene.add_surface(
            Surface::new(
                "ball",
                Shape::Sphere(Sphere::new(1.)),
                Transf::new_identity(),
                Material::diffuse(Color::white()),
            )
            .into_handle(),
        );
        scene.add_surface(
            Surface::new(
                "shield",
                Shape::Sphere(Sphere::new(0.5)),
                Transf::new_translate(Vec3::new(0., 0., 3.)),
                Material::diffuse(Color::white()),
            )
            .into_handle(),
        );
        scene.add_light(Light::point(Vec3::new(0., 0., 6.), Attenuation::none(), Color::white(), 1.));

        let config = RenderConfig::default();
        let agg = LightingAggregator::new(&scene, &config);
        let engine = ShadingEngine::new(&config);
        let (ball, shield) = (&agg.candidates()[0], &agg.candidates()[1]);

        let names: Vec<&str> = ball.other_surfaces().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["shield"]);
        let names: Vec<&str> = shield.other_surfaces().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ball"]);

        // Shading only intersects the candidate's own surface, so the ray can pass the shield:
        let ray = Ray::new(Vec3::new(0., 0., 10.), Vec3::new(0., 0., -1.));
        assert!(ball.shade(ray, EPS, &engine).unwrap().is_black());
        let lit = shield.shade(ray, EPS, &engine).unwrap();
        assert!((lit.r - 1.).abs() < 1e-12);
    }

    #[test]
    fn lights_on_the_same_surface_add_up() {
        let mut scene = scene();
        let config = RenderConfig::default();
        let ray = Ray::new(Vec3::new(0., 0., 5.), Vec3::new(0., 0., -1.));

        let both = LightingAggregator::new(&scene, &config).evaluate(ray).unwrap();
        let ambient_only = {
            scene.lights.remove(0);
            LightingAggregator::new(&scene, &config).evaluate(ray).unwrap()
        };
        // The ambient term is material color times light:
        assert!((ambient_only.r - 0.1).abs() < 1e-12);
        assert!(both.r > ambient_only.r);
    }

    #[test]
    fn miss_is_none() {
        let scene = scene();
        let agg = LightingAggregator::new(&scene, &RenderConfig::default());
        let ray = Ray::new(Vec3::new(0., 0., 5.), Vec3::new(0., 0., 1.));
        assert!(agg.evaluate(ray).is_none());
    }

    #[test]
    fn cached_matches_uncached_exactly() {
        let scene = scene();
        let config = RenderConfig::default();
        let camera = scene.camera.clone().unwrap();
        let (w, h, ssw, ssh) = (12, 9, 2, 2);

        let mut agg = LightingAggregator::new(&scene, &config);
        agg.set_dimensions(&*camera, w, h, ssw, ssh);
        assert!(!agg.is_rank_cache_ready());

        let res = Vec2 { x: w, y: h };
        let ss = Vec2 { x: ssw, y: ssh };
        let mut hits = 0;
        for y in 0..(h * ssh) {
            for x in 0..(w * ssw) {
                let position = y * (w * ssw) + x;
                let ray = subpixel_ray(
                    &*camera,
                    res,
                    ss,
                    Vec2 { x: x / ssw, y: y / ssh },
                    Vec2 { x: x % ssw, y: y % ssh },
                );
                let uncached = agg.evaluate(ray);
                let cached = agg.evaluate_at(position).unwrap();
                assert_eq!(uncached, cached);
                if cached.is_some() {
                    hits += 1;
                }
            }
        }
        assert!(agg.is_rank_cache_ready());
        assert!(hits > 0);

        agg.reset_rank_cache();
        assert!(!agg.is_rank_cache_ready());
    }

    #[test]
    fn cache_needs_input() {
        let scene = scene();
        let agg = LightingAggregator::new(&scene, &RenderConfig::default());
        assert!(agg.init_rank_cache().is_err());
        assert!(agg.evaluate_at(0).is_err());
    }

    #[test]
    fn out_of_range_position_is_an_error() {
        let scene = scene();
        let mut agg = LightingAggregator::new(&scene, &RenderConfig::default());
        agg.set_kernel_input(vec![Ray::new(Vec3::new(0., 0., 5.), Vec3::new(0., 0., -1.))]);
        assert!(agg.evaluate_at(0).unwrap().is_some());
        assert!(agg.evaluate_at(1).is_err());
    }
}
