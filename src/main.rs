use lumen::camera::PinholeCamera;
use lumen::config::RenderConfig;
use lumen::geometry::csg::{Csg, CsgOp};
use lumen::geometry::plane::Plane;
use lumen::geometry::sphere::Sphere;
use lumen::geometry::{Shape, Surface};
use lumen::light::{AreaLight, AreaShape, Attenuation, Light};
use lumen::material::Material;
use lumen::scene::Scene;
use lumen::spectrum::Color;
use lumen::threading::{ProgressMonitor, Tracer};
use lumen::threadpool::CancelToken;
use lumen::transform::Transf;
use pmath::vector::{Vec2, Vec3};

use log::{error, info};

use std::sync::atomic::{AtomicUsize, Ordering};

struct LogProgress {
    done: AtomicUsize,
    rows: usize,
    row_len: usize,
}

impl ProgressMonitor for LogProgress {
    fn increment(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        info!("{}/{} rows", done, self.rows);
    }

    fn increment_size(&self) -> usize {
        // One increment per row:
        self.row_len
    }
}

fn build_scene() -> Scene {
    let mut scene = Scene::new();

    let body = Surface::new(
        "body",
        Shape::Sphere(Sphere::new(1.)),
        Transf::new_identity(),
        Material::diffuse(Color::new(0.9, 0.4, 0.1)).with_highlight(Color::white(), 32.),
    )
    .into_handle();
    let bite = Surface::new(
        "bite",
        Shape::Sphere(Sphere::new(0.6)),
        Transf::new_translate(Vec3::new(0.6, -0.6, 0.6)),
        Material::diffuse(Color::new(0.9, 0.8, 0.6)),
    )
    .into_handle();
    scene.add_surface(
        Surface::new(
            "bitten",
            Shape::Csg(Csg::new(CsgOp::Difference, body, bite)),
            Transf::new_identity(),
            Material::diffuse(Color::white()),
        )
        .into_handle(),
    );
    scene.add_surface(
        Surface::new(
            "floor",
            Shape::Plane(Plane::new()),
            Transf::new_translate(Vec3::new(0., 0., -1.)),
            Material::diffuse(Color::from_scalar(0.8)),
        )
        .into_handle(),
    );

    scene.add_light(Light::ambient(Color::white(), 0.08));
    scene.add_light(Light::area(
        AreaLight::new(
            AreaShape::Sphere {
                center: Vec3::new(3., -4., 5.),
                radius: 0.5,
            },
            Attenuation { a: 0., b: 0.05, c: 1. },
            16,
            0x5eed,
        ),
        Color::white(),
        1.2,
    ));

    scene.set_camera(PinholeCamera::new(
        Vec3::new(0., -5., 1.5),
        Vec3::new(0., 5., -1.5),
        Vec3::new(0., 0., 1.),
        Vec2 { x: 1.6, y: 1.6 },
        1.,
    ));
    scene
}

fn main() {
    env_logger::init();

    let config = RenderConfig {
        supersample: Vec2 { x: 2, y: 2 },
        rank_cache: true,
        ..RenderConfig::default()
    };
    let scene = build_scene();
    let progress = LogProgress {
        done: AtomicUsize::new(0),
        rows: config.res.y,
        row_len: config.res.x,
    };

    let tracer = Tracer::new(config);
    let image = match tracer.render(&scene, &progress, &CancelToken::new()) {
        Ok(image) => image,
        Err(e) => {
            error!("Render failed: {}", e);
            std::process::exit(1);
        }
    };

    // Print a rough brightness map of the frame:
    const RAMP: &[u8] = b" .:-=+*#%@";
    for row in image.rows() {
        let line: String = row
            .iter()
            .map(|c| {
                let v = c.clamp(0., 1.).max_component();
                RAMP[((v * (RAMP.len() - 1) as f64).round() as usize).min(RAMP.len() - 1)] as char
            })
            .collect();
        println!("{}", line);
    }
}
