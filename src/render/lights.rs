//! Scene lighting: one sun plus up to four point lights, Phong shaded.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }

    /// Fraction of the light left at `distance`
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub sun: DirectionalLight,
    pub points: Vec<PointLight>,
    pub shininess: f32,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            sun: DirectionalLight {
                direction: Vec3::new(-0.2, -1.0, -0.3),
                ambient: Vec3::splat(0.2),
                diffuse: Vec3::splat(0.5),
                specular: Vec3::ONE,
            },
            points: vec![
                PointLight::at(Vec3::new(0.7, 35.2, 2.0)),
                PointLight::at(Vec3::new(2.3, 32.3, -4.0)),
                PointLight::at(Vec3::new(-4.0, 36.0, -12.0)),
                PointLight::at(Vec3::new(0.0, 40.0, -3.0)),
            ],
            shininess: 64.0,
        }
    }
}

impl Lighting {
    /// Lights beyond [`MAX_POINT_LIGHTS`] are dropped.
    pub fn uniform_data(&self) -> LightUniformData {
        let mut points = [PointLightUniform::zeroed(); MAX_POINT_LIGHTS];
        for (slot, light) in points.iter_mut().zip(&self.points) {
            *slot = PointLightUniform {
                position: light.position.extend(1.0),
                ambient: light.ambient.extend(0.0),
                diffuse: light.diffuse.extend(0.0),
                specular: light.specular.extend(0.0),
                attenuation: Vec4::new(light.constant, light.linear, light.quadratic, 0.0),
            };
        }
        LightUniformData {
            sun: DirectionalLightUniform {
                direction: self.sun.direction.extend(0.0),
                ambient: self.sun.ambient.extend(0.0),
                diffuse: self.sun.diffuse.extend(0.0),
                specular: self.sun.specular.extend(0.0),
            },
            points,
            params: Vec4::new(
                self.shininess,
                self.points.len().min(MAX_POINT_LIGHTS) as f32,
                0.0,
                0.0,
            ),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    pub direction: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PointLightUniform {
    pub position: Vec4,
    pub ambient: Vec4,
    pub diffuse: Vec4,
    pub specular: Vec4,
    pub attenuation: Vec4,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightUniformData {
    pub sun: DirectionalLightUniform,
    pub points: [PointLightUniform; MAX_POINT_LIGHTS],
    pub params: Vec4,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<LightUniformData>(), 64 + 4 * 80 + 16);
    }

    #[test]
    fn extra_point_lights_are_dropped() {
        let mut lighting = Lighting::default();
        lighting.points.push(PointLight::at(Vec3::ZERO));
        let data = lighting.uniform_data();
        assert_eq!(data.params.y, MAX_POINT_LIGHTS as f32);
        assert_eq!(data.params.x, 64.0);
    }

    #[test]
    fn attenuation_falls_off() {
        let light = PointLight::at(Vec3::ZERO);
        assert_eq!(light.attenuation(0.0), 1.0);
        assert!(light.attenuation(10.0) < 0.25);
    }
}
