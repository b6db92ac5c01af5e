//! Asynchronous model + texture loading with byte-level progress.
//!
//! A load yields two things: a progress stream that is advisory only, and a
//! single outcome future that either resolves to a finished [`ModelAsset`]
//! or to one terminal [`LoadError`].

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;
use std::thread;

use super::gltf::{parse_model, ModelAsset, TextureBinding};
use super::texture::decode_texture;
use crate::error::{LoadError, LoadResult};
use crate::traits::{AssetSource, Download};

/// Texture to fetch and bind onto a named mesh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRequest {
    pub url: String,
    pub mesh: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub model_url: String,
    pub texture: Option<TextureRequest>,
}

impl LoadRequest {
    pub fn model(url: impl Into<String>) -> Self {
        Self {
            model_url: url.into(),
            texture: None,
        }
    }

    pub fn with_texture(mut self, url: impl Into<String>, mesh: impl Into<String>) -> Self {
        self.texture = Some(TextureRequest {
            url: url.into(),
            mesh: mesh.into(),
        });
        self
    }
}

/// Bytes received so far across every download of one load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    /// `None` when any download did not announce its length
    pub total: Option<u64>,
}

impl LoadProgress {
    /// Ratio in [0, 1], or `None` if indeterminate
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some((self.loaded as f64 / total as f64).clamp(0.0, 1.0)),
            _ => None,
        }
    }
}

/// An in-flight load
pub struct LoadTask {
    pub progress: UnboundedReceiver<LoadProgress>,
    pub outcome: LocalBoxFuture<'static, LoadResult<ModelAsset>>,
}

impl std::fmt::Debug for LoadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadTask").finish_non_exhaustive()
    }
}

struct ProgressTracker {
    sender: UnboundedSender<LoadProgress>,
    loaded: u64,
    total: Option<u64>,
}

impl ProgressTracker {
    /// Collect a download's chunks, reporting after each one
    async fn drain(&mut self, download: Download) -> LoadResult<Vec<u8>> {
        let mut bytes = Vec::with_capacity(download.content_length.unwrap_or(0) as usize);
        let mut chunks = download.chunks;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            self.loaded += chunk.len() as u64;
            bytes.extend_from_slice(&chunk);
            // receiver gone means nobody is listening, which is fine
            let _ = self.sender.unbounded_send(LoadProgress {
                loaded: self.loaded,
                total: self.total,
            });
        }
        Ok(bytes)
    }
}

fn decode_blocking(
    model_url: &str,
    model_bytes: &[u8],
    texture: Option<(TextureRequest, Vec<u8>)>,
) -> LoadResult<ModelAsset> {
    let mut asset = parse_model(model_url, model_bytes)?;
    if let Some((texture, bytes)) = texture {
        asset.texture_binding = Some(TextureBinding {
            texture: Arc::new(decode_texture(&texture.url, &bytes)?),
            mesh: texture.mesh,
        });
    }
    Ok(asset)
}

/// Parse and decode on a worker thread; the polling thread only waits for the result
async fn decode(
    model_url: String,
    model_bytes: Vec<u8>,
    texture: Option<(TextureRequest, Vec<u8>)>,
) -> LoadResult<ModelAsset> {
    let (sender, receiver) = oneshot::channel();
    let worker_url = model_url.clone();
    thread::Builder::new()
        .name(format!("decode {}", model_url))
        .spawn(move || {
            // receiver gone means the load was abandoned
            let _ = sender.send(decode_blocking(&worker_url, &model_bytes, texture));
        })
        .map_err(|e| LoadError::Worker {
            url: model_url.clone(),
            reason: e.to_string(),
        })?;

    receiver.await.map_err(|_| LoadError::Worker {
        url: model_url,
        reason: "worker exited without a result".into(),
    })?
}

/// Fetches and decodes assets from one [`AssetSource`]
#[derive(Clone)]
pub struct AssetLoader {
    source: Rc<dyn AssetSource>,
}

impl AssetLoader {
    pub fn new(source: Rc<dyn AssetSource>) -> Self {
        Self { source }
    }

    /// Start loading. Nothing happens until the outcome is polled.
    pub fn load(&self, request: LoadRequest) -> LoadTask {
        let (sender, progress) = mpsc::unbounded();
        let source = Rc::clone(&self.source);

        let outcome = async move {
            let model = source.open(&request.model_url).await?;
            let texture = match &request.texture {
                Some(texture) => Some((texture, source.open(&texture.url).await?)),
                None => None,
            };

            let total = match &texture {
                Some((_, download)) => model.content_length.zip(download.content_length).map(|(a, b)| a + b),
                None => model.content_length,
            };
            let mut tracker = ProgressTracker {
                sender,
                loaded: 0,
                total,
            };

            let model_bytes = tracker.drain(model).await?;
            let texture_bytes = match texture {
                Some((request, download)) => Some((request.clone(), tracker.drain(download).await?)),
                None => None,
            };

            let asset = decode(request.model_url.clone(), model_bytes, texture_bytes).await?;

            log::debug!(
                "{}: loaded {} bytes, {} meshes, {} clips",
                request.model_url,
                tracker.loaded,
                asset.mesh_count(),
                asset.clips.len()
            );
            Ok(asset)
        }
        .boxed_local();

        LoadTask { progress, outcome }
    }
}
