use glam::Mat4;
use std::collections::HashMap;

use crate::math::AABB;
use crate::types::{Mesh, Transform};

/// Index of a node inside one [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: Option<String>, transform: Transform, mesh: Option<Mesh>) -> Self {
        Self {
            name,
            transform,
            mesh,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: &str, transform: Transform) -> Self {
        Self::new(Some(name.to_string()), transform, None)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed transform hierarchy.
///
/// Nodes are only ever appended below an existing parent, so every parent
/// index is smaller than its children's and world matrices resolve in one
/// forward pass.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    by_name: HashMap<String, Vec<NodeId>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::group("scene", Transform::IDENTITY)],
            by_name: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // the root always exists
        false
    }

    /// Append `node` under `parent` and index its name
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        if let Some(name) = &node.name {
            self.by_name.entry(name.clone()).or_default().push(id);
        }
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn transform_mut(&mut self, id: NodeId) -> &mut Transform {
        &mut self.nodes[id.0].transform
    }

    /// Every node carrying `name`, in insertion order
    pub fn find(&self, name: &str) -> &[NodeId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self.nodes[id.0].transform.matrix();
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            matrix = self.nodes[parent.0].transform.matrix() * matrix;
            cursor = self.nodes[parent.0].parent;
        }
        matrix
    }

    /// World matrix of every node, indexed by `NodeId::index`
    pub fn world_matrices(&self) -> Vec<Mat4> {
        let mut out: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let local = node.transform.matrix();
            let world = match node.parent {
                Some(parent) => out[parent.0] * local,
                None => local,
            };
            out.push(world);
        }
        out
    }

    /// `id` and everything below it, depth first
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.nodes[next.0].children.iter().rev());
        }
        out
    }

    /// Nodes with a mesh below `id`, paired with their world matrix
    pub fn meshes_under(&self, id: NodeId) -> Vec<(NodeId, Mat4)> {
        let world = self.world_matrices();
        self.descendants(id)
            .into_iter()
            .filter(|n| self.nodes[n.0].mesh.is_some())
            .map(|n| (n, world[n.0]))
            .collect()
    }

    /// World-space bounds of all meshes below `id`
    pub fn bounds_under(&self, id: NodeId) -> Option<AABB> {
        self.meshes_under(id)
            .into_iter()
            .filter_map(|(n, m)| self.nodes[n.0].mesh.as_ref().map(|mesh| mesh.bounds.transformed(&m)))
            .reduce(|a, b| a.union(&b))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_new_graph_has_root_only() {
        let graph = SceneGraph::new();
        assert_eq!(graph.len(), 1);
        assert!(graph.node(graph.root()).children().is_empty());
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add(root, Node::group("a", Transform::from_translation(Vec3::X)));
        let b = graph.add(a, Node::group("b", Transform::from_translation(Vec3::Y)));

        let p = graph.world_matrix(b).transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(graph.world_matrices()[b.index()], graph.world_matrix(b));
    }

    #[test]
    fn test_find_returns_all_same_named_nodes() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let first = graph.add(root, Node::group("screen", Transform::IDENTITY));
        let second = graph.add(first, Node::group("screen", Transform::IDENTITY));

        assert_eq!(graph.find("screen"), &[first, second]);
        assert!(graph.find("keyboard").is_empty());
    }

    #[test]
    fn test_descendants_depth_first() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = graph.add(root, Node::group("a", Transform::IDENTITY));
        let a1 = graph.add(a, Node::group("a1", Transform::IDENTITY));
        let b = graph.add(root, Node::group("b", Transform::IDENTITY));

        assert_eq!(graph.descendants(root), vec![root, a, a1, b]);
        assert_eq!(graph.descendants(a), vec![a, a1]);
    }
}
