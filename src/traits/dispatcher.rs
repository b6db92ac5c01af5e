use serde::{Deserialize, Serialize};

/// Page-level effect triggered by a hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Navigate to an external URL in a new browsing context
    OpenUrl { url: String },
}

/// Performs actions on behalf of the engine
pub trait ActionDispatcher {
    fn dispatch(&self, action: &Action);
}

/// Opens URLs with the desktop's default handler
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl ActionDispatcher for SystemOpener {
    fn dispatch(&self, action: &Action) {
        match action {
            Action::OpenUrl { url } => {
                if let Err(e) = open::that_detached(url) {
                    log::error!("failed to open {}: {}", url, e);
                }
            }
        }
    }
}

/// Logs actions instead of performing them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

impl ActionDispatcher for LogDispatcher {
    fn dispatch(&self, action: &Action) {
        log::info!("dispatch (dry run): {:?}", action);
    }
}
