use futures::channel::{mpsc, oneshot};
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::task::Poll;
use std::thread;

use crate::error::FetchError;
use crate::traits::{AssetSource, Download};

/// Default transfer chunk, matching a typical network read
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

fn chunked(bytes: Vec<u8>, chunk_size: usize) -> Vec<Vec<u8>> {
    bytes.chunks(chunk_size.max(1)).map(<[u8]>::to_vec).collect()
}

/// Serves same-origin URLs (`/static/...`) from a directory on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    chunk_size: usize,
}

impl FileSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Map a URL path onto the root, refusing to climb out of it
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let relative = url.split(['?', '#']).next().unwrap_or(url).trim_start_matches('/');
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

/// Completes on its second poll. Fetches never resolve in the poll that starts them.
async fn yield_once() {
    let mut yielded = false;
    future::poll_fn(move |cx| {
        if yielded {
            return Poll::Ready(());
        }
        yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    })
    .await
}

fn io_error(url: String, error: io::Error) -> FetchError {
    match error.kind() {
        io::ErrorKind::NotFound => FetchError::NotFound(url),
        _ => FetchError::Io { url, source: error },
    }
}

/// Reader thread body: announce the length, then stream the file chunk by chunk.
/// Stops early once the receiving side is dropped.
fn read_in_chunks(
    url: String,
    path: PathBuf,
    chunk_size: usize,
    header: oneshot::Sender<Result<Option<u64>, FetchError>>,
    chunks: mpsc::UnboundedSender<Result<Vec<u8>, FetchError>>,
) {
    let mut file = match File::open(&path) {
        Ok(file) => file,
        Err(e) => {
            let _ = header.send(Err(io_error(url, e)));
            return;
        }
    };
    let length = file.metadata().ok().map(|m| m.len());
    log::debug!("{}: streaming {:?} bytes from {:?}", url, length, path);
    if header.send(Ok(length)).is_err() {
        return;
    }

    loop {
        let mut buffer = vec![0; chunk_size];
        match file.read(&mut buffer) {
            Ok(0) => return,
            Ok(n) => {
                buffer.truncate(n);
                if chunks.unbounded_send(Ok(buffer)).is_err() {
                    return;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                let _ = chunks.unbounded_send(Err(FetchError::Io { url, source }));
                return;
            }
        }
    }
}

impl AssetSource for FileSource {
    /// Reads on a dedicated thread; the returned future and stream only receive
    fn open(&self, url: &str) -> LocalBoxFuture<'static, Result<Download, FetchError>> {
        let url = url.to_string();
        let Some(path) = self.resolve(&url) else {
            return future::ready(Err(FetchError::NotFound(url))).boxed_local();
        };

        let (header_tx, header_rx) = oneshot::channel();
        let (chunk_tx, chunk_rx) = mpsc::unbounded();
        let reader_url = url.clone();
        let chunk_size = self.chunk_size.max(1);
        let spawned = thread::Builder::new()
            .name(format!("fetch {}", url))
            .spawn(move || read_in_chunks(reader_url, path, chunk_size, header_tx, chunk_tx));
        if let Err(source) = spawned {
            return future::ready(Err(FetchError::Io { url, source })).boxed_local();
        }

        async move {
            yield_once().await;
            // a dropped sender means the reader died before reporting
            let content_length = header_rx
                .await
                .map_err(|_| FetchError::Interrupted {
                    url: url.clone(),
                    received: 0,
                })??;
            Ok::<_, FetchError>(Download {
                content_length,
                chunks: chunk_rx.boxed_local(),
            })
        }
        .boxed_local()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    bytes: Vec<u8>,
    announce_length: bool,
    /// Interrupt the transfer after this many chunks
    fail_after: Option<usize>,
}

/// In-memory asset table, for embedded assets and simulated transfers
#[derive(Debug, Clone)]
pub struct MemorySource {
    entries: HashMap<String, Entry>,
    chunk_size: usize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.insert(
            url.into(),
            Entry {
                bytes,
                announce_length: true,
                fail_after: None,
            },
        );
        self
    }

    /// Serve without a content length, so progress is indeterminate
    pub fn with_unknown_length(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.entries.insert(
            url.into(),
            Entry {
                bytes,
                announce_length: false,
                fail_after: None,
            },
        );
        self
    }

    /// Serve `chunks` chunks of `bytes`, then fail as a dropped connection would
    pub fn with_interrupted(mut self, url: impl Into<String>, bytes: Vec<u8>, chunks: usize) -> Self {
        self.entries.insert(
            url.into(),
            Entry {
                bytes,
                announce_length: true,
                fail_after: Some(chunks),
            },
        );
        self
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSource for MemorySource {
    fn open(&self, url: &str) -> LocalBoxFuture<'static, Result<Download, FetchError>> {
        let Some(entry) = self.entries.get(url).cloned() else {
            return future::ready(Err(FetchError::NotFound(url.to_string()))).boxed_local();
        };

        let content_length = entry.announce_length.then_some(entry.bytes.len() as u64);
        let mut chunks: Vec<Result<Vec<u8>, FetchError>> =
            chunked(entry.bytes, self.chunk_size).into_iter().map(Ok).collect();

        if let Some(limit) = entry.fail_after {
            chunks.truncate(limit);
            let received = chunks
                .iter()
                .map(|c| c.as_ref().map_or(0, |b| b.len() as u64))
                .sum();
            chunks.push(Err(FetchError::Interrupted {
                url: url.to_string(),
                received,
            }));
        }

        future::ready(Ok(Download {
            content_length,
            chunks: stream::iter(chunks).boxed_local(),
        }))
        .boxed_local()
    }
}
