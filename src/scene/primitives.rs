use glam::{Vec2, Vec3};
use std::f32::consts::TAU;

use crate::types::{Material, Mesh, Primitive};

/// Cone centred on its axis midpoint, apex at `+height / 2`, with a capped base.
///
/// Faces are emitted unshared so each carries its own flat normal; three
/// radial segments give the triangular pyramid used for accents.
pub fn cone(radius: f32, height: f32, segments: u32, material: Material) -> Option<Mesh> {
    let segments = segments.max(3);
    let half = height * 0.5;
    let apex = Vec3::new(0.0, half, 0.0);
    let base_center = Vec3::new(0.0, -half, 0.0);

    let rim: Vec<Vec3> = (0..segments)
        .map(|i| {
            let theta = i as f32 / segments as f32 * TAU;
            Vec3::new(radius * theta.sin(), -half, radius * theta.cos())
        })
        .collect();

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut push_face = |a: Vec3, b: Vec3, c: Vec3| {
        let n = (b - a).cross(c - a).normalize_or_zero();
        positions.extend([a, b, c]);
        normals.extend([n, n, n]);
        uvs.extend([Vec2::new(0.5, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)]);
    };

    for i in 0..segments as usize {
        let a = rim[i];
        let b = rim[(i + 1) % segments as usize];
        // side, counter-clockwise seen from outside
        push_face(apex, a, b);
        // base cap, facing down
        push_face(base_center, b, a);
    }

    let indices = (0..positions.len() as u32).collect();
    Mesh::new(vec![Primitive {
        positions,
        normals,
        uvs,
        indices,
        material,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_segment_cone_shape() {
        let mesh = cone(0.08, 0.18, 3, Material::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 6);
        assert!((mesh.bounds.max.y - 0.09).abs() < 1e-6);
        assert!((mesh.bounds.min.y + 0.09).abs() < 1e-6);
    }

    #[test]
    fn test_normals_point_outward() {
        let mesh = cone(1.0, 2.0, 8, Material::default()).unwrap();
        let prim = &mesh.primitives[0];
        for tri in prim.triangles() {
            let centroid =
                (prim.positions[tri[0]] + prim.positions[tri[1]] + prim.positions[tri[2]]) / 3.0;
            assert!(prim.normals[tri[0]].dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_segments_floor_at_three() {
        let mesh = cone(1.0, 1.0, 1, Material::default()).unwrap();
        assert_eq!(mesh.triangle_count(), 6);
    }
}
