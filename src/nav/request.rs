use crate::io::shell::{ROOT_CONTAINER, SHELL_PREFIX};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TRACE_ID: AtomicU64 = AtomicU64::new(1);

/// Classified navigation destination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavTarget {
    /// The synthetic "all devices" container.
    RootContainer,
    /// An opaque shell-item identifier (`shell:` prefixed).
    ShellItem(String),
    /// An ordinary directory path.
    Directory(PathBuf),
}

impl NavTarget {
    pub fn classify(raw: &str) -> Self {
        if raw == ROOT_CONTAINER {
            NavTarget::RootContainer
        } else if raw.starts_with(SHELL_PREFIX) {
            NavTarget::ShellItem(raw.to_string())
        } else {
            NavTarget::Directory(PathBuf::from(raw))
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::classify(&path.to_string_lossy())
    }

    /// The path form used for snapshot keys, history and per-folder memory.
    pub fn as_path(&self) -> PathBuf {
        match self {
            NavTarget::RootContainer => PathBuf::from(ROOT_CONTAINER),
            NavTarget::ShellItem(id) => PathBuf::from(id),
            NavTarget::Directory(path) => path.clone(),
        }
    }

    pub fn is_root_container(&self) -> bool {
        matches!(self, NavTarget::RootContainer)
    }
}

/// One "go to path X" request. Immutable once created; the trace id is
/// monotonic across the process.
#[derive(Clone, Debug)]
pub struct NavigationRequest {
    pub target: NavTarget,
    pub select: Vec<PathBuf>,
    pub trace_id: u64,
}

impl NavigationRequest {
    pub fn to(target: NavTarget) -> Self {
        Self {
            target,
            select: Vec::new(),
            trace_id: NEXT_TRACE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn to_path(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self::to(NavTarget::from_path(&path))
    }

    pub fn with_selection(mut self, select: Vec<PathBuf>) -> Self {
        self.select = select;
        self
    }
}
