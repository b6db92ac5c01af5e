//! Error types for asset loading and scene attachment

use thiserror::Error;

/// Result type for asset loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Transport-level failures reported by an [`AssetSource`](crate::traits::AssetSource)
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("I/O error reading {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transfer of {url} interrupted after {received} bytes")]
    Interrupted { url: String, received: u64 },
}

/// Terminal failure of one load request
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("malformed model {url}: {source}")]
    Format {
        url: String,
        #[source]
        source: gltf::Error,
    },

    /// Fails the whole load: the textured mesh is never shown half-finished
    #[error("texture {url} could not be decoded: {source}")]
    Texture {
        url: String,
        #[source]
        source: image::ImageError,
    },

    #[error("model {0} contains no scene")]
    EmptyScene(String),

    /// The background decoder could not start or stopped without a result
    #[error("decoding {url} failed: {reason}")]
    Worker { url: String, reason: String },
}

/// Non-fatal problems found while attaching an asset
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachWarning {
    #[error("no mesh named {0:?} in the loaded hierarchy")]
    MissingTargetMesh(String),

    #[error("a model is already attached; ignoring {0}")]
    AlreadyAttached(String),
}
