use glam::Vec3;

/// Half-line `origin + t * direction`, `t >= 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Direction is normalized on construction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Parametric span `(t_near, t_far)` of the ray inside the box, `None` on a miss
/// or when the box lies behind the origin. `t_near` is negative when the origin
/// is inside.
fn slab(ray_origin: Vec3, ray_dir: Vec3, box_min: Vec3, box_max: Vec3) -> Option<(f32, f32)> {
    const EPSILON: f32 = 1e-8;

    // Near-zero components clamp to a huge inverse instead of dividing by zero
    let inv_dir = Vec3::new(
        if ray_dir.x.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.x) } else { 1.0 / ray_dir.x },
        if ray_dir.y.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.y) } else { 1.0 / ray_dir.y },
        if ray_dir.z.abs() < EPSILON { 1.0 / EPSILON.copysign(ray_dir.z) } else { 1.0 / ray_dir.z },
    );

    let t_min = (box_min - ray_origin) * inv_dir;
    let t_max = (box_max - ray_origin) * inv_dir;

    let t1 = t_min.min(t_max);
    let t2 = t_min.max(t_max);

    let t_near = t1.x.max(t1.y).max(t1.z);
    let t_far = t2.x.min(t2.y).min(t2.z);

    if t_near > t_far || t_far < 0.0 {
        return None;
    }
    Some((t_near, t_far))
}

/// Slab test. Returns the entry distance, the exit distance when the origin
/// is inside the box, or -1.0 on a miss.
pub fn intersect_aabb(ray_origin: Vec3, ray_dir: Vec3, box_min: Vec3, box_max: Vec3) -> f32 {
    match slab(ray_origin, ray_dir, box_min, box_max) {
        Some((t_near, _)) if t_near >= 0.0 => t_near,
        Some((_, t_far)) if t_far > 0.001 => t_far,
        _ => -1.0,
    }
}

/// Closest distance at which anything inside the box can be hit: the entry
/// distance, or 0.0 when the origin is inside. Use this to prune nearest-hit
/// searches.
pub fn aabb_entry(ray_origin: Vec3, ray_dir: Vec3, box_min: Vec3, box_max: Vec3) -> Option<f32> {
    slab(ray_origin, ray_dir, box_min, box_max).map(|(t_near, _)| t_near.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(ray.direction, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_intersect_aabb_hit() {
        let t = intersect_aabb(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(5.0, -1.0, -1.0),
            Vec3::new(10.0, 1.0, 1.0),
        );
        assert!((t - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_intersect_aabb_miss() {
        let t = intersect_aabb(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(5.0, 2.0, 2.0),
            Vec3::new(10.0, 3.0, 3.0),
        );
        assert!(t < 0.0);
    }

    #[test]
    fn test_intersect_aabb_inside() {
        let t = intersect_aabb(
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, -1.0),
            Vec3::new(10.0, 1.0, 1.0),
        );
        assert!(t > 0.0);
    }

    #[test]
    fn test_aabb_entry_is_zero_from_inside() {
        let min = Vec3::new(-1.0, -1.0, -10.0);
        let max = Vec3::new(1.0, 1.0, 10.0);
        assert_eq!(aabb_entry(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, min, max), Some(0.0));
        // the exit-distance test reports the far side instead
        assert!((intersect_aabb(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, min, max) - 15.0).abs() < 1e-4);

        let entry = aabb_entry(Vec3::new(0.0, 0.0, 20.0), Vec3::NEG_Z, min, max).unwrap();
        assert!((entry - 10.0).abs() < 1e-4);
        assert_eq!(aabb_entry(Vec3::new(0.0, 0.0, 20.0), Vec3::Z, min, max), None);
    }
}
