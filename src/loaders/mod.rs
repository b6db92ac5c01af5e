pub mod asset_loader;
pub mod gltf;
pub mod source;
pub mod texture;

pub use asset_loader::{AssetLoader, LoadProgress, LoadRequest, LoadTask, TextureRequest};
pub use gltf::{parse_model, AssetNode, ModelAsset, TextureBinding};
pub use source::{FileSource, MemorySource};
pub use texture::decode_texture;
