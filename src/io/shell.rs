// Shell namespace - non-hierarchical entries addressed by opaque ids

use crate::entry::FileEntry;
use std::path::PathBuf;

/// Pseudo-path of the synthetic "all devices" container.
pub const ROOT_CONTAINER: &str = "shell:root";

/// Prefix marking an opaque shell-item identifier.
pub const SHELL_PREFIX: &str = "shell:";

/// Accessor for the auxiliary non-hierarchical namespace. Consumed only when
/// a navigation target is a shell-item identifier rather than a path.
pub trait ShellNamespace: Send + Sync {
    fn list_children(&self, id: &str) -> Vec<FileEntry>;
    fn display_name(&self, id: &str) -> String;
    fn parent_of(&self, id: &str) -> Option<String>;
}

/// Default namespace: one container listing the local roots.
pub struct DeviceRoots;

impl ShellNamespace for DeviceRoots {
    fn list_children(&self, id: &str) -> Vec<FileEntry> {
        if id != ROOT_CONTAINER {
            return Vec::new();
        }

        let mut children = Vec::new();
        children.push(FileEntry::synthetic("File System", PathBuf::from("/"), true));
        if let Some(dirs) = directories::UserDirs::new() {
            let home = dirs.home_dir().to_path_buf();
            let name = home
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "Home".to_string());
            children.push(FileEntry::synthetic(name, home, true));
        }
        children
    }

    fn display_name(&self, id: &str) -> String {
        if id == ROOT_CONTAINER {
            "This Computer".to_string()
        } else {
            id.trim_start_matches(SHELL_PREFIX).to_string()
        }
    }

    fn parent_of(&self, id: &str) -> Option<String> {
        if id == ROOT_CONTAINER {
            None
        } else {
            Some(ROOT_CONTAINER.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_container_lists_local_roots() {
        let roots = DeviceRoots.list_children(ROOT_CONTAINER);
        assert!(!roots.is_empty());
        assert!(roots.iter().all(|e| e.is_dir));
    }

    #[test]
    fn root_container_has_no_parent() {
        assert_eq!(DeviceRoots.parent_of(ROOT_CONTAINER), None);
        assert_eq!(
            DeviceRoots.parent_of("shell:device-1"),
            Some(ROOT_CONTAINER.to_string())
        );
    }
}
