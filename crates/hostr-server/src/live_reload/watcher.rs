//! Filesystem watcher.
//!
//! Watches every directory under the served root for write events and emits
//! one [`ChangeSignal`] per detected write. Hidden subtrees are excluded.
//! The directory set is a snapshot taken at startup: directories created
//! later are not observed (documented limitation).

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::ChangeSignal;

/// Start watching `root` for writes.
///
/// Returns the watcher handle (which must be kept alive for the watches to
/// persist) and the receiving end of the signal channel.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created. Failures to watch
/// individual directories are logged and skipped.
pub(crate) fn watch(
    root: &Path,
) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<ChangeSignal>), notify::Error> {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut watcher =
        notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
            Ok(event) if is_write(&event) => {
                let _ = tx.send(ChangeSignal);
            }
            Ok(_) => {}
            Err(err) => {
                // Transient OS watch errors must not take down live reload.
                tracing::warn!(error = %err, "Watch error");
            }
        })?;

    for dir in directories_to_watch(root) {
        if let Err(err) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            tracing::warn!(path = %dir.display(), error = %err, "Failed to watch directory");
        }
    }

    Ok((watcher, rx))
}

/// Whether a filesystem event counts as a write.
fn is_write(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_))
}

/// Directories under `root` to watch, hidden subtrees excluded.
fn directories_to_watch(root: &Path) -> Vec<PathBuf> {
    WalkBuilder::new(root)
        .hidden(true)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_some_and(|t| t.is_dir()))
        .map(ignore::DirEntry::into_path)
        .collect()
}
