mod aabb;
mod ray;

pub use aabb::AABB;
pub use ray::{aabb_entry, intersect_aabb, Ray};
