use std::collections::HashMap;

/// Displayed geometry of a canvas element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mount {
    /// CSS width in logical pixels
    pub width: u32,
    /// CSS height in logical pixels
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Mount {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f32) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }
}

/// Finds canvas elements by their stable id. `None` means the feature is disabled on this page.
pub trait MountRegistry {
    fn lookup(&self, canvas_id: &str) -> Option<Mount>;
}

/// Fixed set of mounts known up front
#[derive(Debug, Clone, Default)]
pub struct StaticMounts {
    mounts: HashMap<String, Mount>,
}

impl StaticMounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, canvas_id: impl Into<String>, mount: Mount) -> Self {
        self.mounts.insert(canvas_id.into(), mount);
        self
    }

    pub fn insert(&mut self, canvas_id: impl Into<String>, mount: Mount) {
        self.mounts.insert(canvas_id.into(), mount);
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

impl MountRegistry for StaticMounts {
    fn lookup(&self, canvas_id: &str) -> Option<Mount> {
        self.mounts.get(canvas_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_mounts_lookup() {
        let mounts = StaticMounts::new().with("aboutModel", Mount::new(360, 480));
        assert_eq!(mounts.lookup("aboutModel"), Some(Mount::new(360, 480)));
        assert_eq!(mounts.lookup("githubModel"), None);
        assert_eq!(mounts.len(), 1);
    }

    #[test]
    fn test_pixel_ratio_builder() {
        let mount = Mount::new(100, 50).with_pixel_ratio(2.0);
        assert_eq!(mount.pixel_ratio, 2.0);
        assert_eq!(mount.width, 100);
    }
}
