//! Descriptor file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::policy::CachePolicyDescriptor;

/// A watcher that monitors a descriptor file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<CachePolicyDescriptor>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated descriptors.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<CachePolicyDescriptor>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. Events are handled on notify's own thread;
    /// the returned watcher must be kept alive for as long as updates are wanted.
    ///
    /// The parent directory is watched rather than the file, so saves that
    /// replace the file (write to a temp file, then rename) keep being seen.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (dir, target) = watch_target(&self.path)?;
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    if relevant && event.paths.iter().any(|p| p == &target) {
                        tracing::info!(path = %path.display(), "Descriptor change detected, reloading");
                        match CachePolicyDescriptor::load(&path) {
                            Ok(descriptor) => {
                                let _ = tx.send(descriptor);
                            }
                            Err(e) => {
                                tracing::error!(
                                    error = %e,
                                    "Failed to reload descriptor. Keeping current descriptor."
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Descriptor watcher started");
        Ok(watcher)
    }
}

/// Canonical parent directory of `path`, and the path events will report for it.
fn watch_target(path: &Path) -> Result<(PathBuf, PathBuf), notify::Error> {
    let file_name = path
        .file_name()
        .ok_or_else(|| notify::Error::generic("descriptor path has no file name"))?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = parent.canonicalize().map_err(notify::Error::io)?;
    let target = dir.join(file_name);

    Ok((dir, target))
}

/// Swap every received descriptor into `live` until the sender side closes.
pub async fn apply_updates(
    live: Arc<ArcSwap<CachePolicyDescriptor>>,
    mut updates: mpsc::UnboundedReceiver<CachePolicyDescriptor>,
) {
    while let Some(descriptor) = updates.recv().await {
        tracing::info!(
            service = %descriptor.name(),
            rules = descriptor.config().rules.len(),
            "Descriptor swapped"
        );
        live.store(Arc::new(descriptor));
    }
}
