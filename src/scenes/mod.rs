mod portrait;
mod workstation;

pub use portrait::create_portrait_scene;
pub use workstation::{create_workstation_scene, PROFILE_URL, SCREEN_MESH};

use crate::config::SceneConfig;

/// Every scene the page can host, in page order
pub fn builtin() -> Vec<SceneConfig> {
    vec![create_portrait_scene(), create_workstation_scene()]
}
