use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use std::sync::Arc;

use crate::math::AABB;

/// Linear RGB color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// `0xRRGGBB` as used in page stylesheets
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

/// Local translation / rotation / scale of a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Rotation given as XYZ Euler angles in radians
    pub fn from_euler(translation: Vec3, euler: Vec3, scale: Vec3) -> Self {
        Self {
            translation,
            rotation: Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z),
            scale,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Texture {
    /// Nearest-texel lookup with repeat wrapping, returned in [0, 1]
    pub fn sample(&self, uv: Vec2) -> [f32; 4] {
        if self.width == 0 || self.height == 0 {
            return [1.0; 4];
        }
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();
        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);
        let i = ((y * self.width + x) * 4) as usize;
        match self.data.get(i..i + 4) {
            Some(px) => [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
                px[3] as f32 / 255.0,
            ],
            None => [1.0; 4],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    /// Lit surface: base color modulated by lights, plus emission
    Standard {
        base_color: [f32; 4],
        emissive: Color,
        emissive_intensity: f32,
        texture: Option<Arc<Texture>>,
        double_sided: bool,
    },
    /// Flat textured surface that ignores lighting
    Unlit { texture: Arc<Texture> },
}

impl Material {
    pub fn color(base_color: [f32; 4]) -> Self {
        Material::Standard {
            base_color,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            texture: None,
            double_sided: false,
        }
    }

    pub fn is_double_sided(&self) -> bool {
        match self {
            Material::Standard { double_sided, .. } => *double_sided,
            Material::Unlit { .. } => false,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::color([0.7, 0.7, 0.7, 1.0])
    }
}

/// Indexed triangle list with one material
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    /// Empty when the source had none; face normals are used instead
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    pub material: Material,
}

impl Primitive {
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [t[0] as usize, t[1] as usize, t[2] as usize])
            .filter(|t| t.iter().all(|&i| i < self.positions.len()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub primitives: Vec<Primitive>,
    /// Local-space bounds over every primitive
    pub bounds: AABB,
}

impl Mesh {
    /// `None` when no primitive carries a vertex
    pub fn new(primitives: Vec<Primitive>) -> Option<Self> {
        let bounds = AABB::from_points(
            primitives
                .iter()
                .flat_map(|p| p.positions.iter().copied()),
        )?;
        Some(Self { primitives, bounds })
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(|p| p.indices.len() / 3).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let mint = Color::from_hex(0x43c59e);
        assert!((mint.r - 0x43 as f32 / 255.0).abs() < 1e-6);
        assert!((mint.g - 0xc5 as f32 / 255.0).abs() < 1e-6);
        assert!((mint.b - 0x9e as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_from_euler_matches_quat() {
        let t = Transform::from_euler(Vec3::ZERO, Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0), Vec3::ONE);
        let rotated = t.matrix().transform_vector3(Vec3::X);
        assert!((rotated - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_texture_sample_wraps() {
        let texture = Texture {
            width: 2,
            height: 1,
            data: vec![255, 0, 0, 255, 0, 0, 255, 255],
        };
        assert_eq!(texture.sample(Vec2::new(0.25, 0.5)), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(texture.sample(Vec2::new(0.75, 0.5)), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(texture.sample(Vec2::new(1.25, 0.5)), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mesh_without_vertices_is_rejected() {
        let prim = Primitive {
            positions: vec![],
            normals: vec![],
            uvs: vec![],
            indices: vec![],
            material: Material::default(),
        };
        assert!(Mesh::new(vec![prim]).is_none());
    }

    #[test]
    fn test_triangles_skip_out_of_range_indices() {
        let prim = Primitive {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![],
            uvs: vec![],
            indices: vec![0, 1, 2, 0, 1, 7],
            material: Material::default(),
        };
        assert_eq!(prim.triangles().count(), 1);
    }
}
