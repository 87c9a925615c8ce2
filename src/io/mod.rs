pub mod enumerate;
pub mod shell;
pub mod watch;

use std::sync::Arc;

/// Wake-up hook into the UI-owned execution context, used by background
/// workers to get their results observed (a repaint request under egui).
pub type RepaintHandle = Arc<dyn Fn() + Send + Sync>;

pub use enumerate::{read_directory, sort_listing, CancelToken, EnumOutcome, ListError, Listing};
pub use shell::{DeviceRoots, ShellNamespace, ROOT_CONTAINER, SHELL_PREFIX};
pub use watch::DirWatcher;
