use futures::future::LocalBoxFuture;
use futures::stream::LocalBoxStream;

use crate::error::FetchError;

/// An opened transfer: an optional announced length plus a stream of byte chunks
pub struct Download {
    pub content_length: Option<u64>,
    pub chunks: LocalBoxStream<'static, Result<Vec<u8>, FetchError>>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Where asset bytes come from (same-origin static files in a page, a directory natively)
pub trait AssetSource {
    /// Begin a transfer. Resolves once headers are known or the resource is found missing.
    fn open(&self, url: &str) -> LocalBoxFuture<'static, Result<Download, FetchError>>;
}
