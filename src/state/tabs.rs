// Tabs state - one directory view per tab, each memoizing its last listing

use crate::entry::FileEntry;
use crate::state::folder_view::paths_eq_fold;
use crate::state::sort::{compare_entries, SortOptions};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// State for a single tab (directory view). The snapshot fields memoize the
/// last bound listing so switching back to the tab skips re-enumeration.
#[derive(Clone)]
pub struct TabState {
    pub label: String,
    pub current_path: PathBuf,
    pub history: Vec<PathBuf>,
    pub history_index: usize,

    // Snapshot
    pub snapshot_path: Option<PathBuf>,
    pub is_search_mode: bool,
    pub sort: SortOptions,
    pub entries: Vec<FileEntry>,
    pub raw_entries: Vec<FileEntry>,
    pub selected_paths: HashSet<PathBuf>,
    pub selected_index: Option<usize>,
    pub scroll_anchor: usize,
    pub stale: bool,
}

impl TabState {
    pub fn new(path: PathBuf) -> Self {
        let label = tab_label(&path);
        Self {
            label,
            current_path: path.clone(),
            history: vec![path],
            history_index: 0,
            snapshot_path: None,
            is_search_mode: false,
            sort: SortOptions::default(),
            entries: Vec::new(),
            raw_entries: Vec::new(),
            selected_paths: HashSet::new(),
            selected_index: None,
            scroll_anchor: 0,
            stale: false,
        }
    }

    pub fn update_label(&mut self) {
        self.label = tab_label(&self.current_path);
    }

    pub fn push_history(&mut self, path: PathBuf) {
        // Remove any forward history when navigating to a new path
        self.history.truncate(self.history_index + 1);
        self.history.push(path.clone());
        self.history_index += 1;
        self.current_path = path;
    }

    pub fn go_back(&mut self) -> Option<PathBuf> {
        if self.history_index > 0 {
            self.history_index -= 1;
            self.current_path = self.history[self.history_index].clone();
            Some(self.current_path.clone())
        } else {
            None
        }
    }

    pub fn go_forward(&mut self) -> Option<PathBuf> {
        if self.history_index + 1 < self.history.len() {
            self.history_index += 1;
            self.current_path = self.history[self.history_index].clone();
            Some(self.current_path.clone())
        } else {
            None
        }
    }

    /// Hand out the memoized listing if it is valid for `path`: the stored
    /// path must match case-insensitively, the tab must not be mid-search,
    /// and the snapshot must not have been invalidated since. A snapshot
    /// recorded under a different order than `sort` still hits, but the
    /// handed-out list is re-sorted from the raw copy first.
    pub fn try_take(
        &self,
        path: &Path,
        sort: &SortOptions,
    ) -> Option<(Vec<FileEntry>, Vec<FileEntry>)> {
        if self.is_search_mode || self.stale {
            return None;
        }
        let stored = self.snapshot_path.as_ref()?;
        if !paths_eq_fold(stored, path) {
            return None;
        }
        if self.sort == *sort {
            return Some((self.entries.clone(), self.raw_entries.clone()));
        }
        let mut copy = self.raw_entries.clone();
        copy.sort_by(|a, b| compare_entries(a, b, sort));
        Some((copy, self.raw_entries.clone()))
    }

    pub fn put(
        &mut self,
        path: PathBuf,
        entries: Vec<FileEntry>,
        raw_entries: Vec<FileEntry>,
        sort: SortOptions,
    ) {
        self.snapshot_path = Some(path);
        self.entries = entries;
        self.raw_entries = raw_entries;
        self.sort = sort;
        self.stale = false;
    }

    pub fn mark_stale(&mut self) {
        self.stale = true;
    }
}

fn tab_label(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("/")
        .to_string()
}

/// Manages multiple tabs
pub struct TabsManager {
    pub tabs: Vec<TabState>,
    pub active_tab: usize,
}

impl TabsManager {
    pub fn new(initial_path: PathBuf) -> Self {
        Self {
            tabs: vec![TabState::new(initial_path)],
            active_tab: 0,
        }
    }

    pub fn active(&self) -> Option<&TabState> {
        self.tabs.get(self.active_tab)
    }

    pub fn active_mut(&mut self) -> Option<&mut TabState> {
        self.tabs.get_mut(self.active_tab)
    }

    pub fn new_tab(&mut self, path: PathBuf) {
        self.tabs.push(TabState::new(path));
        self.active_tab = self.tabs.len() - 1;
    }

    pub fn close_tab(&mut self, index: usize) -> bool {
        if self.tabs.len() <= 1 {
            return false; // Can't close the last tab
        }

        self.tabs.remove(index);

        if self.active_tab >= index && self.active_tab > 0 {
            self.active_tab -= 1;
        }

        true
    }

    pub fn close_current_tab(&mut self) -> bool {
        self.close_tab(self.active_tab)
    }

    pub fn switch_to_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.active_tab = index;
        }
    }

    pub fn next_tab(&mut self) {
        self.active_tab = (self.active_tab + 1) % self.tabs.len();
    }

    pub fn prev_tab(&mut self) {
        if self.active_tab == 0 {
            self.active_tab = self.tabs.len() - 1;
        } else {
            self.active_tab -= 1;
        }
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// The live path's content was re-synced: bring every other tab's
    /// matching snapshot up to date in place. A tab sorted the same way
    /// reuses the new ordered list directly; otherwise its copy of the raw
    /// list is re-sorted under the tab's own order.
    pub fn refresh_snapshots(
        &mut self,
        live_path: &Path,
        ordered: &[FileEntry],
        raw: &[FileEntry],
        live_sort: &SortOptions,
    ) {
        let active = self.active_tab;
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            if i == active || tab.is_search_mode {
                continue;
            }
            let matches = tab
                .snapshot_path
                .as_ref()
                .map(|p| paths_eq_fold(p, live_path))
                .unwrap_or(false);
            if !matches {
                continue;
            }

            if tab.sort == *live_sort {
                tab.entries = ordered.to_vec();
            } else {
                let mut copy = raw.to_vec();
                let sort = tab.sort;
                copy.sort_by(|a, b| compare_entries(a, b, &sort));
                tab.entries = copy;
            }
            tab.raw_entries = raw.to_vec();
            tab.stale = false;
        }
    }
}
