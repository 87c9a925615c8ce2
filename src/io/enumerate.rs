use crate::entry::FileEntry;
use crate::state::sort::{compare_entries, SortOptions};
use rayon::slice::ParallelSliceMut;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// Below this the parallel sort costs more than it saves
const PAR_SORT_THRESHOLD: usize = 512;
const CANCEL_CHECK_STRIDE: usize = 64;

/// Cooperative cancellation handle shared with in-flight listing work.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    Cancelled,
    Failed(String),
}

impl fmt::Display for ListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListError::Cancelled => write!(f, "listing cancelled"),
            ListError::Failed(msg) => write!(f, "listing failed: {}", msg),
        }
    }
}

/// An ordered listing plus the raw input it was computed from. The raw list
/// is retained so tab snapshots can re-sort under a different order later.
pub struct Listing {
    pub entries: Vec<FileEntry>,
    pub raw: Vec<FileEntry>,
}

/// Result of one enumeration cycle, tagged with the navigation generation
/// that was current when the work started.
pub struct EnumOutcome {
    pub generation: u64,
    pub path: PathBuf,
    pub result: Result<Listing, ListError>,
}

pub fn read_directory(
    path: &Path,
    show_hidden: bool,
    cancel: &CancelToken,
) -> Result<Vec<FileEntry>, ListError> {
    let read_dir = fs::read_dir(path).map_err(|e| ListError::Failed(e.to_string()))?;

    let mut entries = Vec::new();
    for (i, entry) in read_dir.flatten().enumerate() {
        if i % CANCEL_CHECK_STRIDE == 0 && cancel.is_cancelled() {
            return Err(ListError::Cancelled);
        }
        let path = entry.path();
        if !show_hidden {
            if let Some(name) = path.file_name() {
                if name.to_string_lossy().starts_with('.') {
                    continue;
                }
            }
        }
        if let Some(file_entry) = FileEntry::from_path(path) {
            entries.push(file_entry);
        }
    }

    if cancel.is_cancelled() {
        return Err(ListError::Cancelled);
    }
    Ok(entries)
}

/// Comparator-side cancellation check, polled every `CANCEL_CHECK_STRIDE`
/// comparisons. Once tripped, the remaining comparisons collapse to Equal so
/// the sort winds down early instead of finishing the full ordering work.
struct CancelWatch<'a> {
    cancel: &'a CancelToken,
    tripped: AtomicBool,
    comparisons: AtomicUsize,
}

impl<'a> CancelWatch<'a> {
    fn new(cancel: &'a CancelToken) -> Self {
        Self {
            cancel,
            tripped: AtomicBool::new(false),
            comparisons: AtomicUsize::new(0),
        }
    }

    fn cancelled(&self) -> bool {
        if self.tripped.load(Ordering::Relaxed) {
            return true;
        }
        if self.comparisons.fetch_add(1, Ordering::Relaxed) % CANCEL_CHECK_STRIDE == 0
            && self.cancel.is_cancelled()
        {
            self.tripped.store(true, Ordering::Relaxed);
            return true;
        }
        false
    }
}

/// Order a raw listing, keeping the raw copy alongside. Runs on the caller's
/// (background) thread; cancellation is observed before the sort, during it
/// through the comparator, and after it.
pub fn sort_listing(
    raw: Vec<FileEntry>,
    opts: &SortOptions,
    cancel: &CancelToken,
) -> Result<Listing, ListError> {
    if cancel.is_cancelled() {
        return Err(ListError::Cancelled);
    }

    let watch = CancelWatch::new(cancel);
    let cmp = |a: &FileEntry, b: &FileEntry| {
        if watch.cancelled() {
            std::cmp::Ordering::Equal
        } else {
            compare_entries(a, b, opts)
        }
    };
    let mut ordered = raw.clone();
    if ordered.len() >= PAR_SORT_THRESHOLD {
        ordered.par_sort_by(cmp);
    } else {
        ordered.sort_by(cmp);
    }

    if cancel.is_cancelled() {
        return Err(ListError::Cancelled);
    }
    Ok(Listing {
        entries: ordered,
        raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_token_aborts_before_sorting() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = sort_listing(Vec::new(), &SortOptions::default(), &cancel);
        assert!(matches!(result, Err(ListError::Cancelled)));
    }

    #[test]
    fn missing_directory_reports_failure() {
        let cancel = CancelToken::new();
        let result = read_directory(Path::new("/definitely/not/here"), false, &cancel);
        assert!(matches!(result, Err(ListError::Failed(_))));
    }

    #[test]
    fn comparator_watch_trips_within_one_stride() {
        let cancel = CancelToken::new();
        let watch = CancelWatch::new(&cancel);
        assert!(!watch.cancelled());

        cancel.cancel();
        let mut calls = 0;
        while !watch.cancelled() {
            calls += 1;
            assert!(
                calls <= CANCEL_CHECK_STRIDE,
                "cancellation never observed mid-sort"
            );
        }
        // Stays tripped for every later comparison
        assert!(watch.cancelled());
    }

    #[test]
    fn sort_produces_ordered_and_raw_lists() {
        let cancel = CancelToken::new();
        let raw = vec![
            FileEntry::synthetic("b", PathBuf::from("/t/b"), false),
            FileEntry::synthetic("a", PathBuf::from("/t/a"), false),
        ];
        let listing = sort_listing(raw, &SortOptions::default(), &cancel).unwrap();
        assert_eq!(listing.entries[0].name, "a");
        assert_eq!(listing.raw[0].name, "b");
    }
}
