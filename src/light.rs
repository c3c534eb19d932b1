use crate::spectrum::Color;
use pmath::numbers::Float;
use pmath::vector::Vec3;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Quadratic falloff coefficients: the light is divided by `a*d^2 + b*d + c`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Attenuation {
    /// No falloff at all.
    pub fn none() -> Self {
        Attenuation { a: 0., b: 0., c: 1. }
    }

    pub fn inverse_square() -> Self {
        Attenuation { a: 1., b: 0., c: 0. }
    }

    pub fn factor(self, dist2: f64) -> f64 {
        self.a * dist2 + self.b * dist2.sqrt() + self.c
    }
}

#[derive(Clone, Copy, Debug)]
pub enum AreaShape {
    /// Samples are spread over the surface of a sphere.
    Sphere { center: Vec3<f64>, radius: f64 },
    /// Samples are spread over the parallelogram `corner + s*edge_u + t*edge_v`.
    Rectangle {
        corner: Vec3<f64>,
        edge_u: Vec3<f64>,
        edge_v: Vec3<f64>,
    },
}

/// An area light approximated by a fixed set of point lights.
#[derive(Clone, Debug)]
pub struct AreaLight {
    pub shape: AreaShape,
    pub attenuation: Attenuation,
    samples: Vec<Vec3<f64>>,
}

impl AreaLight {
    /// Places `num_samples` points on the shape. The same seed always gives the same
    /// points, so renders are repeatable.
    pub fn new(shape: AreaShape, attenuation: Attenuation, num_samples: usize, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let samples = (0..num_samples)
            .map(|_| match shape {
                AreaShape::Sphere { center, radius } => {
                    let u = rng.gen_range(0., f64::TWO_PI);
                    let v = rng.gen_range(0., f64::TWO_PI);
                    center
                        + Vec3::new(
                            radius * u.sin() * v.cos(),
                            radius * u.sin() * v.sin(),
                            radius * u.cos(),
                        )
                }
                AreaShape::Rectangle {
                    corner,
                    edge_u,
                    edge_v,
                } => {
                    let s: f64 = rng.gen();
                    let t: f64 = rng.gen();
                    corner + edge_u.scale(s) + edge_v.scale(t)
                }
            })
            .collect();

        AreaLight {
            shape,
            attenuation,
            samples,
        }
    }

    pub fn samples(&self) -> &[Vec3<f64>] {
        &self.samples
    }

    pub fn centroid(&self) -> Vec3<f64> {
        match self.shape {
            AreaShape::Sphere { center, .. } => center,
            AreaShape::Rectangle {
                corner,
                edge_u,
                edge_v,
            } => corner + (edge_u + edge_v).scale(0.5),
        }
    }
}

#[derive(Clone, Debug)]
pub enum LightKind {
    /// Lights everything evenly, from nowhere in particular.
    Ambient,
    Point {
        location: Vec3<f64>,
        attenuation: Attenuation,
    },
    /// Light arriving along `direction` (pointing away from the light).
    Directional { direction: Vec3<f64> },
    SurfaceSampled(AreaLight),
}

#[derive(Clone, Debug)]
pub struct Light {
    pub color: Color,
    pub intensity: f64,
    pub cast_shadows: bool,
    pub kind: LightKind,
}

impl Light {
    pub fn ambient(color: Color, intensity: f64) -> Self {
        Light {
            color,
            intensity,
            cast_shadows: false,
            kind: LightKind::Ambient,
        }
    }

    pub fn point(location: Vec3<f64>, attenuation: Attenuation, color: Color, intensity: f64) -> Self {
        Light {
            color,
            intensity,
            cast_shadows: true,
            kind: LightKind::Point {
                location,
                attenuation,
            },
        }
    }

    pub fn directional(direction: Vec3<f64>, color: Color, intensity: f64) -> Self {
        Light {
            color,
            intensity,
            cast_shadows: true,
            kind: LightKind::Directional { direction },
        }
    }

    pub fn area(area: AreaLight, color: Color, intensity: f64) -> Self {
        Light {
            color,
            intensity,
            cast_shadows: true,
            kind: LightKind::SurfaceSampled(area),
        }
    }

    pub fn without_shadows(self) -> Self {
        Light {
            cast_shadows: false,
            ..self
        }
    }

    /// The emitted color before any attenuation.
    pub fn power(&self) -> Color {
        self.color.scale(self.intensity)
    }

    /// Splits an area light into its point lights, each carrying an equal share of
    /// the intensity. Any other light is returned as is.
    pub fn point_samples(&self) -> Vec<Light> {
        match &self.kind {
            LightKind::SurfaceSampled(area) => {
                let intensity = self.intensity / (area.samples().len() as f64);
                area.samples()
                    .iter()
                    .map(|&location| Light {
                        color: self.color,
                        intensity,
                        cast_shadows: self.cast_shadows,
                        kind: LightKind::Point {
                            location,
                            attenuation: area.attenuation,
                        },
                    })
                    .collect()
            }
            _ => vec![self.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_terms() {
        let att = Attenuation { a: 1., b: 2., c: 3. };
        // 4 + 2*2 + 3:
        assert_eq!(att.factor(4.), 11.);
        assert_eq!(Attenuation::none().factor(1234.), 1.);
    }

    #[test]
    fn sphere_samples_lie_on_surface() {
        let center = Vec3::new(1., 2., 3.);
        let area = AreaLight::new(
            AreaShape::Sphere { center, radius: 0.5 },
            Attenuation::none(),
            32,
            7,
        );
        assert_eq!(area.samples().len(), 32);
        for &p in area.samples() {
            assert!(((p - center).length() - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn same_seed_same_samples() {
        let shape = AreaShape::Rectangle {
            corner: Vec3::zero(),
            edge_u: Vec3::new(1., 0., 0.),
            edge_v: Vec3::new(0., 1., 0.),
        };
        let a = AreaLight::new(shape, Attenuation::none(), 8, 42);
        let b = AreaLight::new(shape, Attenuation::none(), 8, 42);
        assert_eq!(a.samples(), b.samples());
        assert_eq!(a.centroid(), Vec3::new(0.5, 0.5, 0.));
    }

    #[test]
    fn samples_split_intensity() {
        let area = AreaLight::new(
            AreaShape::Sphere {
                center: Vec3::zero(),
                radius: 1.,
            },
            Attenuation::none(),
            4,
            1,
        );
        let light = Light::area(area, Color::white(), 2.);
        let samples = light.point_samples();
        assert_eq!(samples.len(), 4);
        for s in samples.iter() {
            assert_eq!(s.intensity, 0.5);
        }
    }
}
