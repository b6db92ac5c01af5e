use glam::Vec3;

use crate::math::Ray;

/// Where a ray crossed a triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    /// Distance along the ray
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

impl TriangleHit {
    /// Barycentric weights for (v0, v1, v2)
    pub fn barycentric(&self) -> (f32, f32, f32) {
        (1.0 - self.u - self.v, self.u, self.v)
    }
}

/// Möller-Trumbore ray-triangle intersection. Both windings are hit.
pub fn moller_trumbore(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<TriangleHit> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    if t < EPSILON {
        return None;
    }

    Some(TriangleHit { t, u, v })
}
