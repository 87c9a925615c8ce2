// Per-folder view memory - sort order and last selection, kept for the session

use crate::state::sort::SortOptions;
use std::collections::HashMap;
use std::path::Path;

/// Case-insensitive key for per-folder maps.
pub fn fold_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

pub fn paths_eq_fold(a: &Path, b: &Path) -> bool {
    fold_key(a) == fold_key(b)
}

#[derive(Default)]
pub struct FolderViewState {
    sort_memory: HashMap<String, SortOptions>,
    last_selected: HashMap<String, String>,
}

impl FolderViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember_sort(&mut self, path: &Path, opts: SortOptions) {
        self.sort_memory.insert(fold_key(path), opts);
    }

    pub fn sort_for(&self, path: &Path) -> Option<SortOptions> {
        self.sort_memory.get(&fold_key(path)).copied()
    }

    pub fn remember_selection(&mut self, path: &Path, name: &str) {
        self.last_selected.insert(fold_key(path), name.to_string());
    }

    pub fn last_selection(&self, path: &Path) -> Option<&str> {
        self.last_selected.get(&fold_key(path)).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::sort::{SortBy, SortOrder, TagPin};
    use std::path::PathBuf;

    #[test]
    fn sort_memory_is_case_insensitive() {
        let mut folders = FolderViewState::new();
        let opts = SortOptions {
            sort_by: SortBy::Size,
            sort_order: SortOrder::Descending,
            dirs_first: true,
            tag_pin: TagPin::Off,
        };
        folders.remember_sort(&PathBuf::from("/Users/Pics"), opts);
        let restored = folders.sort_for(&PathBuf::from("/users/pics")).unwrap();
        assert_eq!(restored.sort_by, SortBy::Size);
        assert_eq!(restored.sort_order, SortOrder::Descending);
    }

    #[test]
    fn last_selection_survives_by_name() {
        let mut folders = FolderViewState::new();
        folders.remember_selection(&PathBuf::from("/a"), "notes.md");
        assert_eq!(folders.last_selection(&PathBuf::from("/A")), Some("notes.md"));
        assert_eq!(folders.last_selection(&PathBuf::from("/b")), None);
    }
}
