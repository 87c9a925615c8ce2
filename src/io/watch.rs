// Filesystem watcher on the active path, feeding content re-sync events

use crate::io::RepaintHandle;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};

pub struct DirWatcher {
    watcher: RecommendedWatcher,
    rx: Receiver<PathBuf>,
    watched: Option<PathBuf>,
}

impl DirWatcher {
    pub fn new(repaint: Option<RepaintHandle>) -> Result<Self, String> {
        let (tx, rx) = channel();

        let watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    // The watch is non-recursive, so the changed directory is
                    // the parent of any reported path.
                    if let Some(path) = event.paths.first() {
                        let dir = path
                            .parent()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| path.clone());
                        let _ = tx.send(dir);
                        if let Some(repaint) = &repaint {
                            repaint();
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        Ok(Self {
            watcher,
            rx,
            watched: None,
        })
    }

    /// Move the watch to a new directory, dropping the previous one.
    pub fn watch(&mut self, path: &Path) {
        if let Some(old) = self.watched.take() {
            let _ = self.watcher.unwatch(&old);
        }
        if self.watcher.watch(path, RecursiveMode::NonRecursive).is_ok() {
            self.watched = Some(path.to_path_buf());
        } else {
            log::debug!("watch failed for {}", path.display());
        }
    }

    pub fn try_recv(&self) -> Option<PathBuf> {
        self.rx.try_recv().ok()
    }
}
