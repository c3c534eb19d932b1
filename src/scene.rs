use crate::camera::Camera;
use crate::geometry::SurfaceHandle;
use crate::light::Light;

use std::sync::Arc;

pub type LightHandle = Arc<Light>;

/// An already built scene. Nothing in it changes while rendering.
#[derive(Default)]
pub struct Scene {
    pub surfaces: Vec<SurfaceHandle>,
    pub lights: Vec<LightHandle>,
    pub camera: Option<Arc<dyn Camera>>,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn add_surface(&mut self, surface: SurfaceHandle) {
        self.surfaces.push(surface);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(Arc::new(light));
    }

    pub fn set_camera<C: Camera + 'static>(&mut self, camera: C) {
        self.camera = Some(Arc::new(camera));
    }
}
