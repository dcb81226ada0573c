use anyhow::{Context as AnyhowContext, Result};
use ignore::WalkBuilder;
use lru::LruCache;
use nextedit_assembler::{ContextConfig, PredictionTracker};
use nextedit_code_chunker::Language;
use nextedit_snapshot_store::{unix_ms_now, FsBlobStore};
use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

const MAX_TRACKED_FILE_BYTES: u64 = 1024 * 1024;
const MAX_CACHED_FILES: usize = 2048;

/// Last seen content of recently touched files, keyed by root-relative path.
///
/// Bounded; a file evicted here has its next change treated as a first sight.
#[derive(Debug)]
pub(crate) struct ContentCache {
    contents: LruCache<String, String>,
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::with_capacity(MAX_CACHED_FILES)
    }
}

impl ContentCache {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            contents: LruCache::new(capacity),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.contents.len()
    }

    /// Remember `content` for `path`; returns the previous content if it differs.
    pub(crate) fn observe(&mut self, path: &str, content: String) -> Option<String> {
        let previous = self.contents.put(path.to_string(), content)?;
        (self.contents.peek(path) != Some(&previous)).then_some(previous)
    }

    pub(crate) fn forget(&mut self, path: &str) {
        self.contents.pop(path);
    }
}

/// Only source files of a known language get snapshots.
fn is_tracked_path(path: &str) -> bool {
    Language::from_path(path) != Language::Unknown
}

struct WatchSession {
    root: PathBuf,
    store_dir: PathBuf,
    cache: ContentCache,
    tracker: PredictionTracker,
}

pub(crate) async fn run_watch(root: &Path, config: ContextConfig, store_dir: &Path) -> Result<()> {
    let root = root
        .canonicalize()
        .with_context(|| format!("Invalid watch root {}", root.display()))?;
    let store_dir = std::fs::create_dir_all(store_dir)
        .and_then(|_| store_dir.canonicalize())
        .with_context(|| format!("Invalid store dir {}", store_dir.display()))?;

    let blobs = Arc::new(FsBlobStore::new(&store_dir));
    let tracker = PredictionTracker::with_blob_store(config, blobs)
        .context("Invalid context configuration")?;
    tracker.restore(unix_ms_now()).await;

    let mut session = WatchSession {
        cache: initial_contents(&root, &store_dir),
        root,
        store_dir,
        tracker,
    };

    let (tx, mut rx) = mpsc::channel::<notify::Result<Event>>(256);
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.blocking_send(res);
        },
        NotifyConfig::default(),
    )
    .context("Failed to start file watcher")?;
    watcher
        .watch(&session.root, RecursiveMode::Recursive)
        .with_context(|| format!("Failed to watch {}", session.root.display()))?;
    log::info!(
        "Watching {} ({} files)",
        session.root.display(),
        session.cache.len()
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                log::info!("Stopping watcher");
                break;
            }
            event = rx.recv() => match event {
                Some(Ok(event)) => session.handle_event(event).await,
                Some(Err(err)) => log::warn!("Watcher error: {err}"),
                None => break,
            },
        }
    }
    Ok(())
}

impl WatchSession {
    async fn handle_event(&mut self, event: Event) {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {}
            EventKind::Remove(_) => {
                for path in &event.paths {
                    if let Some(key) = self.key_for(path) {
                        self.cache.forget(&key);
                    }
                }
                return;
            }
            _ => return,
        }

        for path in event.paths {
            let Some(key) = self.key_for(&path) else {
                continue;
            };
            let Some(content) = read_text(&path).await else {
                continue;
            };
            if let Some(prior) = self.cache.observe(&key, content) {
                if self.tracker.on_edit(&key, &prior, unix_ms_now()).await {
                    log::info!("Recorded snapshot of {key}");
                }
            }
        }
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        if path.starts_with(&self.store_dir) {
            return None;
        }
        let relative = path.strip_prefix(&self.root).ok()?;
        if relative
            .components()
            .any(|c| matches!(c.as_os_str().to_str(), Some(".git")))
        {
            return None;
        }
        let key = relative.to_string_lossy().replace('\\', "/");
        is_tracked_path(&key).then_some(key)
    }
}

async fn read_text(path: &Path) -> Option<String> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    if !meta.is_file() || meta.len() > MAX_TRACKED_FILE_BYTES {
        return None;
    }
    tokio::fs::read_to_string(path).await.ok()
}

/// Current text of the non-ignored source files under `root`
fn initial_contents(root: &Path, store_dir: &Path) -> ContentCache {
    let mut cache = ContentCache::default();
    let mut builder = WalkBuilder::new(root);
    builder.hidden(true).git_ignore(true).git_exclude(true);
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Failed to read entry: {err}");
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_some_and(|t| t.is_file()) || path.starts_with(store_dir) {
            continue;
        }
        if entry
            .metadata()
            .is_ok_and(|meta| meta.len() > MAX_TRACKED_FILE_BYTES)
        {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let key = relative.to_string_lossy().replace('\\', "/");
        if !is_tracked_path(&key) {
            continue;
        }
        if let Ok(content) = std::fs::read_to_string(path) {
            cache.observe(&key, content);
        }
    }
    cache
}
