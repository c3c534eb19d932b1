use crate::config::RenderConfig;
use crate::geometry::{closest_intersection, Interaction, SurfaceHandle};
use crate::light::{Attenuation, Light, LightKind};
use crate::material::Material;
use crate::spectrum::Color;
use pmath::ray::Ray;
use pmath::vector::Vec3;

/// Everything needed to shade one hit for one light. Built fresh for each
/// evaluation and never shared.
///
/// Only the other surfaces are carried: they are the shadow occluders. Other lights
/// would only matter to reflection shading, which this core doesn't do.
pub struct ShaderContext<'a> {
    pub light: &'a Light,
    pub other_surfaces: &'a [SurfaceHandle],
    /// Unit direction from the hit point toward the light (zero for ambient light).
    pub light_direction: Vec3<f64>,
}

impl<'a> ShaderContext<'a> {
    pub fn new(
        light: &'a Light,
        other_surfaces: &'a [SurfaceHandle],
        p: Vec3<f64>,
    ) -> Self {
        let light_direction = match &light.kind {
            LightKind::Ambient => Vec3::zero(),
            LightKind::Point { location, .. } => (*location - p).normalize(),
            LightKind::Directional { direction } => (-*direction).normalize(),
            LightKind::SurfaceSampled(area) => (area.centroid() - p).normalize(),
        };
        ShaderContext {
            light,
            other_surfaces,
            light_direction,
        }
    }
}

/// Computes the color one light gives to one hit.
#[derive(Clone, Copy, Debug)]
pub struct ShadingEngine {
    epsilon: f64,
    enable_shadows: bool,
}

impl ShadingEngine {
    pub fn new(config: &RenderConfig) -> Self {
        ShadingEngine {
            epsilon: config.epsilon,
            enable_shadows: config.enable_shadows,
        }
    }

    /// The shadow mask multiplied by the unoccluded contribution.
    pub fn shade(&self, hit: &Interaction, material: &Material, context: &ShaderContext) -> Color {
        let mask = self.shadow_mask(hit, context);
        if mask.is_black() {
            return mask;
        }
        mask * self.contribution(hit, material, context)
    }

    /// White when the light reaches the point, black when another surface is in the way.
    pub fn shadow_mask(&self, hit: &Interaction, context: &ShaderContext) -> Color {
        if !self.enable_shadows || !context.light.cast_shadows {
            return Color::white();
        }

        let occluded = match &context.light.kind {
            LightKind::Ambient => false,
            LightKind::Point { location, .. } => self.blocked_before(hit.p, *location, context.other_surfaces),
            LightKind::SurfaceSampled(area) => {
                self.blocked_before(hit.p, area.centroid(), context.other_surfaces)
            }
            LightKind::Directional { .. } => {
                let ray = Ray::new(hit.p, context.light_direction);
                closest_intersection(ray, context.other_surfaces.iter().map(|s| &**s), self.epsilon).is_some()
            }
        };

        if occluded {
            Color::black()
        } else {
            Color::white()
        }
    }

    // Whether anything lies strictly between `p` and `target`:
    fn blocked_before(&self, p: Vec3<f64>, target: Vec3<f64>, surfaces: &[SurfaceHandle]) -> bool {
        let to_target = target - p;
        let dist = to_target.length();
        let ray = Ray::new(p, to_target.normalize());
        match closest_intersection(ray, surfaces.iter().map(|s| &**s), self.epsilon) {
            Some(set) => match set.closest(self.epsilon) {
                Some(t) => t < dist,
                None => false,
            },
            None => false,
        }
    }

    /// The unoccluded color the light contributes.
    pub fn contribution(&self, hit: &Interaction, material: &Material, context: &ShaderContext) -> Color {
        let light = context.light;
        match &light.kind {
            LightKind::Ambient => material.color * light.power(),
            LightKind::Point {
                location,
                attenuation,
            } => point_contribution(hit, material, *location, *attenuation, light.power()),
            LightKind::Directional { .. } => {
                material.response(hit.n, context.light_direction, hit.wo, light.power())
            }
            LightKind::SurfaceSampled(area) => {
                let power = light.power().div_scale(area.samples().len() as f64);
                area.samples().iter().fold(Color::black(), |sum, &location| {
                    sum + point_contribution(hit, material, location, area.attenuation, power)
                })
            }
        }
    }
}

fn point_contribution(
    hit: &Interaction,
    material: &Material,
    location: Vec3<f64>,
    attenuation: Attenuation,
    power: Color,
) -> Color {
    let to_light = location - hit.p;
    let dist2 = to_light.length2();
    let light = power.div_scale(attenuation.factor(dist2));
    material.response(hit.n, to_light.normalize(), hit.wo, light)
}
