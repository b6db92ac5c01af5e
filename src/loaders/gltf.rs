use ::gltf::animation::util::ReadOutputs;
use ::gltf::mesh::Mode;
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use std::sync::Arc;

use crate::core::clip::{AnimationClip, Channel, Interpolation, Property};
use crate::error::{LoadError, LoadResult};
use crate::math::AABB;
use crate::types::{Color, Material, Mesh, Primitive, Texture, Transform};

/// One node of a parsed model, indexed as in the source file
#[derive(Debug, Clone)]
pub struct AssetNode {
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub children: Vec<usize>,
}

/// Texture to be bound onto every mesh of the given name at attach time
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    pub mesh: String,
    pub texture: Arc<Texture>,
}

/// A loaded model. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub source_url: String,
    pub nodes: Vec<AssetNode>,
    /// Top-level nodes of the displayed scene
    pub roots: Vec<usize>,
    pub clips: Vec<AnimationClip>,
    /// Model-space bounds of all meshes reachable from `roots`
    pub bounds: Option<AABB>,
    pub texture_binding: Option<TextureBinding>,
}

impl ModelAsset {
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.mesh.is_some()).count()
    }
}

/// Parse a binary or embedded glTF document
pub fn parse_model(url: &str, bytes: &[u8]) -> LoadResult<ModelAsset> {
    let (document, buffers, images) =
        ::gltf::import_slice(bytes).map_err(|source| LoadError::Format {
            url: url.to_string(),
            source,
        })?;

    log::debug!(
        "{}: {} nodes, {} meshes, {} images, {} animations",
        url,
        document.nodes().len(),
        document.meshes().len(),
        images.len(),
        document.animations().len()
    );

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| LoadError::EmptyScene(url.to_string()))?;

    let textures: Vec<Arc<Texture>> = images.iter().map(|image| Arc::new(convert_image(image))).collect();

    let nodes = document
        .nodes()
        .map(|node| {
            let (translation, rotation, scale) = node.transform().decomposed();
            let mesh = node.mesh().and_then(|mesh| {
                let primitives = mesh
                    .primitives()
                    .filter_map(|primitive| convert_primitive(&primitive, &buffers, &textures))
                    .collect();
                Mesh::new(primitives)
            });
            let name = node
                .name()
                .or_else(|| node.mesh().and_then(|m| m.name()))
                .map(str::to_string);

            AssetNode {
                name,
                transform: Transform {
                    translation: Vec3::from_array(translation),
                    rotation: Quat::from_array(rotation),
                    scale: Vec3::from_array(scale),
                },
                mesh,
                children: node.children().map(|c| c.index()).collect(),
            }
        })
        .collect::<Vec<_>>();

    let roots: Vec<usize> = scene.nodes().map(|n| n.index()).collect();

    let clips = document
        .animations()
        .map(|animation| convert_animation(&animation, &buffers))
        .collect();

    let bounds = compute_bounds(&nodes, &roots);

    Ok(ModelAsset {
        source_url: url.to_string(),
        nodes,
        roots,
        clips,
        bounds,
        texture_binding: None,
    })
}

fn convert_primitive(
    primitive: &::gltf::Primitive,
    buffers: &[::gltf::buffer::Data],
    textures: &[Arc<Texture>],
) -> Option<Primitive> {
    if primitive.mode() != Mode::Triangles {
        log::debug!("skipping {:?} primitive", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from_array).collect();
    let normals = reader
        .read_normals()
        .map(|n| n.map(Vec3::from_array).collect())
        .unwrap_or_default();
    let uvs = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().map(Vec2::from_array).collect())
        .unwrap_or_default();
    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();
    let texture = pbr
        .base_color_texture()
        .and_then(|info| textures.get(info.texture().source().index()).cloned());
    let [er, eg, eb] = material.emissive_factor();

    Some(Primitive {
        positions,
        normals,
        uvs,
        indices,
        material: Material::Standard {
            base_color: pbr.base_color_factor(),
            emissive: Color::new(er, eg, eb),
            emissive_intensity: 1.0,
            texture,
            double_sided: material.double_sided(),
        },
    })
}

fn convert_animation(animation: &::gltf::Animation, buffers: &[::gltf::buffer::Data]) -> AnimationClip {
    let mut channels = Vec::new();
    let mut duration = 0.0f32;

    for channel in animation.channels() {
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
        let (Some(inputs), Some(outputs)) = (reader.read_inputs(), reader.read_outputs()) else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let (property, values): (Property, Vec<Vec4>) = match outputs {
            ReadOutputs::Translations(t) => (
                Property::Translation,
                t.map(|v| Vec3::from_array(v).extend(0.0)).collect(),
            ),
            ReadOutputs::Rotations(r) => (
                Property::Rotation,
                r.into_f32().map(Vec4::from_array).collect(),
            ),
            ReadOutputs::Scales(s) => (
                Property::Scale,
                s.map(|v| Vec3::from_array(v).extend(0.0)).collect(),
            ),
            ReadOutputs::MorphTargetWeights(_) => continue,
        };

        let interpolation = match channel.sampler().interpolation() {
            ::gltf::animation::Interpolation::Step => Interpolation::Step,
            ::gltf::animation::Interpolation::Linear => Interpolation::Linear,
            ::gltf::animation::Interpolation::CubicSpline => Interpolation::CubicSpline,
        };

        duration = times.iter().copied().fold(duration, f32::max);
        channels.push(Channel {
            target: channel.target().node().index(),
            property,
            interpolation,
            times,
            values,
        });
    }

    AnimationClip {
        name: animation
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("animation{}", animation.index())),
        duration,
        channels,
    }
}

/// Expand a decoded image into RGBA8
fn convert_image(image: &::gltf::image::Data) -> Texture {
    use ::gltf::image::Format;

    let data = match image.format {
        Format::R8G8B8A8 => image.pixels.clone(),
        Format::R8G8B8 => image
            .pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        Format::R8G8 => image
            .pixels
            .chunks_exact(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        Format::R8 => image.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            log::warn!("unsupported texture format {:?}, substituting white", other);
            vec![255; (image.width * image.height * 4) as usize]
        }
    };

    Texture {
        width: image.width,
        height: image.height,
        data,
    }
}

/// Bounds over every mesh reachable from `roots`, in model space
pub fn compute_bounds(nodes: &[AssetNode], roots: &[usize]) -> Option<AABB> {
    let mut stack: Vec<(usize, Mat4)> = roots.iter().map(|&r| (r, Mat4::IDENTITY)).collect();
    let mut bounds: Option<AABB> = None;

    while let Some((index, parent)) = stack.pop() {
        let Some(node) = nodes.get(index) else {
            continue;
        };
        let world = parent * node.transform.matrix();
        if let Some(mesh) = &node.mesh {
            let b = mesh.bounds.transformed(&world);
            bounds = Some(bounds.map_or(b, |acc| acc.union(&b)));
        }
        stack.extend(node.children.iter().map(|&c| (c, world)));
    }

    bounds
}
