use glam::Vec3;

use super::graph::{NodeId, SceneGraph};
use crate::types::Color;

/// Sky/ground gradient light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

impl HemisphereLight {
    /// Contribution for a world-space normal
    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        let w = normal.y * 0.5 + 0.5;
        self.ground.to_vec3().lerp(self.sky.to_vec3(), w) * self.intensity
    }
}

/// Parallel light shining from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

impl DirectionalLight {
    /// Unit vector pointing towards the light
    pub fn direction(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }

    pub fn irradiance(&self, normal: Vec3) -> Vec3 {
        self.color.to_vec3() * self.intensity * normal.dot(self.direction()).max(0.0)
    }
}

/// Point light positioned relative to a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Zero means unlimited range
    pub range: f32,
    pub anchor: NodeId,
    pub offset: Vec3,
}

impl PointLight {
    pub fn world_position(&self, graph: &SceneGraph) -> Vec3 {
        graph.world_matrix(self.anchor).transform_point3(self.offset)
    }

    pub fn irradiance(&self, light_position: Vec3, point: Vec3, normal: Vec3) -> Vec3 {
        let to_light = light_position - point;
        let distance = to_light.length();
        if distance <= f32::EPSILON {
            return Vec3::ZERO;
        }
        let falloff = if self.range > 0.0 {
            (1.0 - distance / self.range).clamp(0.0, 1.0).powi(2)
        } else {
            1.0
        };
        let lambert = normal.dot(to_light / distance).max(0.0);
        self.color.to_vec3() * self.intensity * falloff * lambert
    }
}

/// Statically configured lights of one scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightRig {
    pub ambient: Option<(Color, f32)>,
    pub hemisphere: Option<HemisphereLight>,
    pub directional: Option<DirectionalLight>,
    pub point: Option<PointLight>,
}

impl LightRig {
    /// Sum of the position-independent lights for a world-space normal
    pub fn static_irradiance(&self, normal: Vec3) -> Vec3 {
        let mut total = Vec3::ZERO;
        if let Some((color, intensity)) = self.ambient {
            total += color.to_vec3() * intensity;
        }
        if let Some(hemi) = &self.hemisphere {
            total += hemi.irradiance(normal);
        }
        if let Some(dir) = &self.directional {
            total += dir.irradiance(normal);
        }
        total
    }
}
