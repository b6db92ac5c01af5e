pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod loaders;
pub mod math;
pub mod scene;
pub mod scenes;
pub mod stage;
pub mod traits;
pub mod types;

pub use config::{SceneConfig, StageConfig};
pub use error::{AttachWarning, FetchError, LoadError, LoadResult};
pub use scene::SceneInstance;
pub use stage::{LoadObserver, LogObserver, Page, Stage, StageState};
