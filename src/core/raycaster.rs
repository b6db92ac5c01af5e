use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::triangle_intersection::moller_trumbore;
use crate::camera::PerspectiveCamera;
use crate::math::{aabb_entry, Ray};
use crate::scene::{NodeId, SceneGraph};
use crate::traits::Action;

/// On-screen rectangle of a canvas, in the same coordinates as pointer events
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rect of a canvas occupying a whole window
    pub fn sized(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Pointer position to normalized device coordinates (+Y up).
    /// `None` for an empty rect.
    pub fn to_ndc(&self, pointer: Vec2) -> Option<Vec2> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        Some(Vec2::new(
            (pointer.x - self.left) / self.width * 2.0 - 1.0,
            -((pointer.y - self.top) / self.height) * 2.0 + 1.0,
        ))
    }
}

/// Nearest mesh under the pointer
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub node: NodeId,
    pub name: Option<String>,
    pub distance: f32,
    pub point: Vec3,
}

/// Cast `ray` against every mesh below `root`, nearest hit wins.
///
/// Single-sided materials only register hits on their front faces.
pub fn raycast(ray: &Ray, graph: &SceneGraph, root: NodeId) -> Option<Hit> {
    let mut nearest: Option<(NodeId, f32)> = None;

    for (id, world) in graph.meshes_under(root) {
        let Some(mesh) = &graph.node(id).mesh else {
            continue;
        };

        let bounds = mesh.bounds.transformed(&world);
        let Some(entry) = aabb_entry(ray.origin, ray.direction, bounds.min, bounds.max) else {
            continue;
        };
        if nearest.is_some_and(|(_, best)| entry > best) {
            continue;
        }

        for primitive in &mesh.primitives {
            let double_sided = primitive.material.is_double_sided();
            for tri in primitive.triangles() {
                let [a, b, c] = tri.map(|i| world.transform_point3(primitive.positions[i]));
                if !double_sided && (b - a).cross(c - a).dot(ray.direction) >= 0.0 {
                    continue;
                }
                let Some(hit) = moller_trumbore(ray, a, b, c) else {
                    continue;
                };
                if nearest.map_or(true, |(_, best)| hit.t < best) {
                    nearest = Some((id, hit.t));
                }
            }
        }
    }

    nearest.map(|(node, distance)| Hit {
        node,
        name: graph.node(node).name.clone(),
        distance,
        point: ray.at(distance),
    })
}

/// Pointer click to nearest hit, through the canvas rect and camera
pub fn hit_test(
    pointer: Vec2,
    rect: &CanvasRect,
    camera: &PerspectiveCamera,
    graph: &SceneGraph,
    root: NodeId,
) -> Option<Hit> {
    let ndc = rect.to_ndc(pointer)?;
    raycast(&camera.ray_through(ndc), graph, root)
}

/// Which hits a target responds to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshMatch {
    /// Only the mesh carrying this name
    Named(String),
    /// Any mesh of the model
    Any,
}

/// Static mapping from a mesh to the action a click on it performs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitTarget {
    pub mesh: MeshMatch,
    pub action: Action,
}

impl HitTarget {
    pub fn matches(&self, hit: &Hit) -> bool {
        match &self.mesh {
            MeshMatch::Any => true,
            MeshMatch::Named(name) => hit.name.as_deref() == Some(name.as_str()),
        }
    }
}

/// First configured target responding to `hit`
pub fn resolve_action<'a>(targets: &'a [HitTarget], hit: &Hit) -> Option<&'a Action> {
    targets.iter().find(|t| t.matches(hit)).map(|t| &t.action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use crate::types::{Material, Mesh, Primitive, Transform};

    fn square(z: f32) -> Mesh {
        Mesh::new(vec![Primitive {
            positions: vec![
                Vec3::new(-1.0, -1.0, z),
                Vec3::new(1.0, -1.0, z),
                Vec3::new(1.0, 1.0, z),
                Vec3::new(-1.0, 1.0, z),
            ],
            normals: vec![],
            uvs: vec![],
            indices: vec![0, 1, 2, 0, 2, 3],
            material: Material::default(),
        }])
        .unwrap()
    }

    fn two_layers() -> (SceneGraph, NodeId) {
        let mut graph = SceneGraph::new();
        let model = graph.add(graph.root(), Node::group("model", Transform::IDENTITY));
        graph.add(model, Node::new(Some("back".into()), Transform::IDENTITY, Some(square(-1.0))));
        graph.add(model, Node::new(Some("front".into()), Transform::IDENTITY, Some(square(0.5))));
        (graph, model)
    }

    #[test]
    fn test_canvas_rect_ndc() {
        let rect = CanvasRect::new(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.to_ndc(Vec2::new(200.0, 100.0)), Some(Vec2::ZERO));
        assert_eq!(rect.to_ndc(Vec2::new(100.0, 50.0)), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(rect.to_ndc(Vec2::new(300.0, 150.0)), Some(Vec2::new(1.0, -1.0)));
        assert_eq!(CanvasRect::sized(0.0, 10.0).to_ndc(Vec2::ZERO), None);
    }

    #[test]
    fn test_nearest_mesh_wins() {
        let (graph, model) = two_layers();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = raycast(&ray, &graph, model).unwrap();
        assert_eq!(hit.name.as_deref(), Some("front"));
        assert!((hit.distance - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_origin_inside_nearer_bounds_is_not_pruned() {
        let mut graph = SceneGraph::new();
        let model = graph.add(graph.root(), Node::group("model", Transform::IDENTITY));
        graph.add(model, Node::new(Some("wall".into()), Transform::IDENTITY, Some(square(0.0))));

        // a quad at z=4 plus a sliver off to the side stretching the bounds over the ray origin
        let mut panel = square(4.0).primitives.remove(0);
        panel.positions.extend([
            Vec3::new(50.0, 0.0, -10.0),
            Vec3::new(51.0, 0.0, -10.0),
            Vec3::new(50.0, 0.0, 10.0),
        ]);
        panel.indices.extend([4, 5, 6]);
        let panel = Mesh::new(vec![panel]).unwrap();
        assert!(panel.bounds.min.z <= -10.0 && panel.bounds.max.z >= 10.0);
        graph.add(model, Node::new(Some("panel".into()), Transform::IDENTITY, Some(panel)));

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let hit = raycast(&ray, &graph, model).unwrap();
        assert_eq!(hit.name.as_deref(), Some("panel"));
        assert!((hit.distance - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_back_faces_are_ignored() {
        let (graph, model) = two_layers();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(raycast(&ray, &graph, model).is_none());
    }

    #[test]
    fn test_miss_returns_none() {
        let (graph, model) = two_layers();
        let ray = Ray::new(Vec3::new(5.0, 5.0, 5.0), Vec3::NEG_Z);
        assert!(raycast(&ray, &graph, model).is_none());
    }

    #[test]
    fn test_hit_test_through_camera() {
        let (graph, model) = two_layers();
        let camera = PerspectiveCamera::new(45.0, 1.0, 0.1, 100.0).with_position(Vec3::new(0.0, 0.0, 3.0));
        let rect = CanvasRect::sized(100.0, 100.0);
        let hit = hit_test(Vec2::new(50.0, 50.0), &rect, &camera, &graph, model).unwrap();
        assert_eq!(hit.name.as_deref(), Some("front"));
        assert!(hit_test(Vec2::new(0.0, 0.0), &rect, &camera, &graph, model).is_none());
    }

    #[test]
    fn test_target_matching() {
        let hit = Hit {
            node: SceneGraph::new().root(),
            name: Some("Screen".into()),
            distance: 1.0,
            point: Vec3::ZERO,
        };
        let open = Action::OpenUrl {
            url: "https://example.com".into(),
        };
        let targets = vec![
            HitTarget {
                mesh: MeshMatch::Named("Keyboard".into()),
                action: Action::OpenUrl { url: "https://wrong.example".into() },
            },
            HitTarget {
                mesh: MeshMatch::Named("Screen".into()),
                action: open.clone(),
            },
        ];
        assert_eq!(resolve_action(&targets, &hit), Some(&open));

        let any = HitTarget {
            mesh: MeshMatch::Any,
            action: open.clone(),
        };
        assert!(any.matches(&Hit { name: None, ..hit }));
    }

    #[test]
    fn test_hit_target_json_shape() {
        let target: HitTarget = serde_json::from_str(
            r#"{"mesh": {"named": "Screen"}, "action": {"kind": "open_url", "url": "https://x.y"}}"#,
        )
        .unwrap();
        assert_eq!(target.mesh, MeshMatch::Named("Screen".into()));

        let any: MeshMatch = serde_json::from_str(r#""any""#).unwrap();
        assert_eq!(any, MeshMatch::Any);
    }
}
