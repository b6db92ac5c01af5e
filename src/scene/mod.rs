pub mod graph;
pub mod instance;
pub mod lights;
pub mod primitives;

pub use graph::{Node, NodeId, SceneGraph};
pub use instance::SceneInstance;
pub use lights::{DirectionalLight, HemisphereLight, LightRig, PointLight};
pub use primitives::cone;
