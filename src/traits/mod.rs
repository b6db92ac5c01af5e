pub mod dispatcher;
pub mod mount;
pub mod renderer;
pub mod source;

pub use dispatcher::{Action, ActionDispatcher, LogDispatcher, SystemOpener};
pub use mount::{Mount, MountRegistry, StaticMounts};
pub use renderer::SceneRenderer;
pub use source::{AssetSource, Download};
