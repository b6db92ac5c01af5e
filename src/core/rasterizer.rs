//! CPU z-buffer rasteriser.
//!
//! Lighting is evaluated per vertex and interpolated; textures are sampled
//! per pixel with perspective-correct UVs. Output is sRGB-encoded RGBA8 on a
//! transparent background.

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use std::f32::consts::FRAC_1_PI;

use super::viewport::Viewport;
use crate::camera::PerspectiveCamera;
use crate::scene::{LightRig, SceneGraph};
use crate::traits::SceneRenderer;
use crate::types::{Material, Primitive};

/// RGBA8 color plus depth, in device pixels
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![[0; 4]; len],
            depth: vec![f32::INFINITY; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Transparent black, depth at infinity
    pub fn clear(&mut self) {
        self.pixels.fill([0; 4]);
        self.depth.fill(f32::INFINITY);
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Row-major RGBA bytes, ready for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Number of pixels with non-zero alpha
    pub fn covered_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p[3] > 0).count()
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn texel_linear(texel: [f32; 4]) -> Vec4 {
    Vec4::new(
        srgb_to_linear(texel[0]),
        srgb_to_linear(texel[1]),
        srgb_to_linear(texel[2]),
        texel[3],
    )
}

/// A vertex after transform and lighting
#[derive(Debug, Clone, Copy)]
struct ShadedVertex {
    screen: Vec2,
    ndc_z: f32,
    inv_w: f32,
    uv: Vec2,
    irradiance: Vec3,
}

pub struct SoftwareRenderer {
    viewport: Viewport,
    buffer: FrameBuffer,
}

impl SoftwareRenderer {
    pub fn new(viewport: Viewport) -> Self {
        let (w, h) = viewport.buffer_size();
        Self {
            viewport,
            buffer: FrameBuffer::new(w, h),
        }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    fn draw_primitive(
        &mut self,
        primitive: &Primitive,
        model: Mat4,
        view_projection: Mat4,
        lights: &LightRig,
        point_light: Option<Vec3>,
    ) {
        let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
        let size = Vec2::new(self.buffer.width as f32, self.buffer.height as f32);
        let double_sided = primitive.material.is_double_sided();

        for tri in primitive.triangles() {
            let world = tri.map(|i| model.transform_point3(primitive.positions[i]));
            let clip = world.map(|p| view_projection * p.extend(1.0));

            // Anything touching the near plane is dropped rather than clipped
            if clip.iter().any(|c| c.w <= f32::EPSILON || c.z < 0.0) {
                continue;
            }

            let ndc = clip.map(|c| c.truncate() / c.w);
            let area = (ndc[1].x - ndc[0].x) * (ndc[2].y - ndc[0].y)
                - (ndc[2].x - ndc[0].x) * (ndc[1].y - ndc[0].y);
            if area == 0.0 || (area < 0.0 && !double_sided) {
                continue;
            }

            let face_normal = (world[1] - world[0]).cross(world[2] - world[0]).normalize_or_zero();
            let flip = if area < 0.0 { -1.0 } else { 1.0 };

            let mut vertices = [ShadedVertex {
                screen: Vec2::ZERO,
                ndc_z: 0.0,
                inv_w: 0.0,
                uv: Vec2::ZERO,
                irradiance: Vec3::ZERO,
            }; 3];
            for k in 0..3 {
                let normal = primitive
                    .normals
                    .get(tri[k])
                    .map(|n| (normal_matrix * *n).normalize_or_zero())
                    .unwrap_or(face_normal)
                    * flip;

                let mut irradiance = lights.static_irradiance(normal);
                if let (Some(light), Some(position)) = (&lights.point, point_light) {
                    irradiance += light.irradiance(position, world[k], normal);
                }

                vertices[k] = ShadedVertex {
                    screen: Vec2::new(
                        (ndc[k].x * 0.5 + 0.5) * size.x,
                        (0.5 - ndc[k].y * 0.5) * size.y,
                    ),
                    ndc_z: ndc[k].z,
                    inv_w: 1.0 / clip[k].w,
                    uv: primitive.uvs.get(tri[k]).copied().unwrap_or(Vec2::ZERO),
                    irradiance,
                };
            }

            self.fill_triangle(&vertices, &primitive.material);
        }
    }

    fn fill_triangle(&mut self, v: &[ShadedVertex; 3], material: &Material) {
        let (w, h) = (self.buffer.width as f32, self.buffer.height as f32);
        let min = v[0].screen.min(v[1].screen).min(v[2].screen).max(Vec2::ZERO);
        let max = v[0].screen.max(v[1].screen).max(v[2].screen).min(Vec2::new(w - 1.0, h - 1.0));
        if min.x > max.x || min.y > max.y {
            return;
        }

        let edge = |a: Vec2, b: Vec2, p: Vec2| (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
        let area = edge(v[0].screen, v[1].screen, v[2].screen);
        if area.abs() < f32::EPSILON {
            return;
        }

        for y in (min.y.floor() as u32)..=(max.y.floor() as u32) {
            for x in (min.x.floor() as u32)..=(max.x.floor() as u32) {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let l0 = edge(v[1].screen, v[2].screen, p) / area;
                let l1 = edge(v[2].screen, v[0].screen, p) / area;
                let l2 = edge(v[0].screen, v[1].screen, p) / area;
                if l0 < 0.0 || l1 < 0.0 || l2 < 0.0 {
                    continue;
                }

                let z = l0 * v[0].ndc_z + l1 * v[1].ndc_z + l2 * v[2].ndc_z;
                let index = (y * self.buffer.width + x) as usize;
                if !(0.0..=1.0).contains(&z) || z >= self.buffer.depth[index] {
                    continue;
                }

                // perspective-correct weights
                let p0 = l0 * v[0].inv_w;
                let p1 = l1 * v[1].inv_w;
                let p2 = l2 * v[2].inv_w;
                let sum = p0 + p1 + p2;
                let (p0, p1, p2) = (p0 / sum, p1 / sum, p2 / sum);

                let uv = v[0].uv * p0 + v[1].uv * p1 + v[2].uv * p2;
                let irradiance = v[0].irradiance * p0 + v[1].irradiance * p1 + v[2].irradiance * p2;
                let color = shade(material, uv, irradiance);
                if color.w <= 0.0 {
                    continue;
                }

                self.buffer.depth[index] = z;
                self.buffer.pixels[index] = [
                    (linear_to_srgb(color.x) * 255.0).round() as u8,
                    (linear_to_srgb(color.y) * 255.0).round() as u8,
                    (linear_to_srgb(color.z) * 255.0).round() as u8,
                    (color.w.clamp(0.0, 1.0) * 255.0).round() as u8,
                ];
            }
        }
    }
}

/// Linear RGBA for one fragment
fn shade(material: &Material, uv: Vec2, irradiance: Vec3) -> Vec4 {
    match material {
        Material::Unlit { texture } => texel_linear(texture.sample(uv)),
        Material::Standard {
            base_color,
            emissive,
            emissive_intensity,
            texture,
            ..
        } => {
            let mut albedo = Vec4::from_array(*base_color);
            if let Some(texture) = texture {
                albedo *= texel_linear(texture.sample(uv));
            }
            let diffuse = albedo.truncate() * irradiance * FRAC_1_PI;
            let emitted = emissive.to_vec3() * *emissive_intensity;
            (diffuse + emitted).extend(albedo.w)
        }
    }
}

impl SceneRenderer for SoftwareRenderer {
    fn set_size(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        let (w, h) = viewport.buffer_size();
        if (w, h) != (self.buffer.width, self.buffer.height) {
            self.buffer = FrameBuffer::new(w, h);
        }
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render(
        &mut self,
        graph: &SceneGraph,
        lights: &LightRig,
        camera: &PerspectiveCamera,
    ) -> &FrameBuffer {
        self.buffer.clear();

        let view_projection = camera.view_projection();
        let worlds = graph.world_matrices();
        let point_light = lights.point.as_ref().map(|p| p.world_position(graph));

        for (id, node) in graph.iter() {
            let Some(mesh) = &node.mesh else {
                continue;
            };
            let model = worlds[id.index()];
            for primitive in &mesh.primitives {
                self.draw_primitive(primitive, model, view_projection, lights, point_light);
            }
        }

        &self.buffer
    }
}
