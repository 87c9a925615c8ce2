// Navigation engine - one in-flight navigation per session, latest-wins

use crate::config::Config;
use crate::entry::FileEntry;
use crate::icons::{IconPipeline, IconPriority, IconRequest};
use crate::io::enumerate::{
    read_directory, sort_listing, CancelToken, EnumOutcome, ListError, Listing,
};
use crate::io::shell::{ShellNamespace, ROOT_CONTAINER};
use crate::io::RepaintHandle;
use crate::nav::request::{NavTarget, NavigationRequest};
use crate::state::folder_view::{paths_eq_fold, FolderViewState};
use crate::state::sort::SortOptions;
use crate::state::tabs::TabsManager;
use crate::surface::DisplaySurface;
use crate::trace::{NavPhase, StatusSink, TraceEvent};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(400);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavState {
    Idle,
    Navigating,
}

/// Cancellable scheduled retry, keyed by path. Arming a new one replaces
/// any existing one; retries never stack.
struct RetrySlot {
    path: PathBuf,
    deadline: Instant,
}

pub struct NavigationSession {
    pub current: NavTarget,
    pub state: NavState,
    cancel: CancelToken,
    pending: Option<NavigationRequest>,
    retry: Option<RetrySlot>,
    select: Vec<PathBuf>,
    sort: SortOptions,
    started: Instant,
    trace_id: u64,
}

impl NavigationSession {
    fn new() -> Self {
        Self {
            current: NavTarget::RootContainer,
            state: NavState::Idle,
            cancel: CancelToken::new(),
            pending: None,
            retry: None,
            select: Vec::new(),
            sort: SortOptions::default(),
            started: Instant::now(),
            trace_id: 0,
        }
    }
}

/// Mutable collaborators handed to the engine per call. All of them live on
/// the UI-owned execution context.
pub struct NavContext<'a> {
    pub tabs: &'a mut TabsManager,
    pub folders: &'a mut FolderViewState,
    pub icons: &'a IconPipeline,
    pub surface: &'a mut dyn DisplaySurface,
    pub sink: &'a mut dyn StatusSink,
    pub config: &'a Config,
}

pub type SelectionCallback = Box<dyn FnMut(&[PathBuf])>;

pub struct NavEngine {
    pub session: NavigationSession,
    generation: Arc<AtomicU64>,
    shell: Arc<dyn ShellNamespace>,
    repaint: Option<RepaintHandle>,
    result_tx: Sender<EnumOutcome>,
    result_rx: Receiver<EnumOutcome>,
    on_selection: Option<SelectionCallback>,
    retry_delay: Duration,
}

impl NavEngine {
    /// `generation` is shared with the icon pipeline so one counter orders
    /// cancellation across both subsystems.
    pub fn new(
        shell: Arc<dyn ShellNamespace>,
        generation: Arc<AtomicU64>,
        repaint: Option<RepaintHandle>,
    ) -> Self {
        let (result_tx, result_rx) = channel();
        Self {
            session: NavigationSession::new(),
            generation,
            shell,
            repaint,
            result_tx,
            result_rx,
            on_selection: None,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn set_retry_delay(&mut self, delay: Duration) {
        self.retry_delay = delay;
    }

    /// Invoked once binding finishes, with the resolved selection.
    pub fn on_selection(&mut self, callback: impl FnMut(&[PathBuf]) + 'static) {
        self.on_selection = Some(Box::new(callback));
    }

    pub fn is_idle(&self) -> bool {
        self.session.state == NavState::Idle && self.session.pending.is_none()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn retry_armed_for(&self, path: &Path) -> bool {
        self.session
            .retry
            .as_ref()
            .map(|slot| paths_eq_fold(&slot.path, path))
            .unwrap_or(false)
    }

    /// Move the session to the request's target. If a navigation is already
    /// in flight, the request lands in the single pending slot (overwriting
    /// any queued one) and the in-flight enumeration is cancelled.
    pub fn navigate_to(&mut self, request: NavigationRequest, cx: &mut NavContext) {
        self.session.retry = None;
        if self.session.state == NavState::Navigating {
            self.session.pending = Some(request);
            self.session.cancel.cancel();
            return;
        }
        self.begin(request, cx);
    }

    /// Escape hatch for a stalled enumeration: trigger the handle and void
    /// the in-flight generation without waiting for the call to return.
    pub fn force_cancel(&mut self, cx: &mut NavContext) {
        if self.session.state != NavState::Navigating {
            return;
        }
        self.session.cancel.cancel();
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.session.state = NavState::Idle;
        if let Some(next) = self.session.pending.take() {
            self.begin(next, cx);
        }
    }

    /// Drain completed enumerations and fire due retries. Called from the
    /// UI-owned context (each frame, or directly in tests).
    pub fn poll(&mut self, cx: &mut NavContext) {
        if self.session.state == NavState::Idle && self.session.pending.is_none() {
            if let Some(slot) = &self.session.retry {
                if Instant::now() >= slot.deadline {
                    let path = slot.path.clone();
                    self.session.retry = None;
                    self.trace(cx, NavPhase::Retried, 0);
                    self.begin(NavigationRequest::to_path(path), cx);
                }
            }
        }

        while let Ok(outcome) = self.result_rx.try_recv() {
            if outcome.generation != self.generation.load(Ordering::SeqCst) {
                // Stale work unit; the expected cancellation signal
                continue;
            }
            self.session.state = NavState::Idle;
            match outcome.result {
                Ok(listing) => {
                    self.trace(cx, NavPhase::Enumerated, listing.entries.len());
                    let sort = self.session.sort;
                    self.bind(cx, outcome.path, listing, sort);
                }
                Err(ListError::Cancelled) => {
                    self.trace(cx, NavPhase::Cancelled, 0);
                    self.maybe_arm_retry(cx, outcome.path);
                }
                Err(ListError::Failed(message)) => {
                    cx.sink.status(&message);
                    self.trace(cx, NavPhase::Failed, 0);
                    if let Some(tab) = cx.tabs.active_mut() {
                        tab.entries.clear();
                        tab.raw_entries.clear();
                        tab.snapshot_path = None;
                    }
                    cx.surface.set_row_count(0);
                    self.maybe_arm_retry(cx, outcome.path);
                }
            }
            self.finish(cx);
        }
    }

    fn begin(&mut self, request: NavigationRequest, cx: &mut NavContext) {
        self.session.retry = None;
        self.session.started = Instant::now();
        self.session.trace_id = request.trace_id;

        // One navigation cycle, one generation
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.session.cancel = CancelToken::new();
        cx.icons.cancel_pending();
        if let Some(tab) = cx.tabs.active_mut() {
            tab.is_search_mode = false;
        }
        self.trace(cx, NavPhase::Requested, 0);

        let mut target = request.target;
        if let NavTarget::Directory(path) = &target {
            if !path.is_dir() {
                cx.sink
                    .status(&format!("Path unavailable: {}", path.display()));
                self.trace(cx, NavPhase::Redirected, 0);
                // Fall back to the root container; no retry for the missing path
                target = NavTarget::RootContainer;
            }
        }

        // Chrome updates land before any listing work starts
        cx.sink.title(&self.title_for(&target));

        // Leaving or entering the root container changes the column schema;
        // clear the rows rather than render mismatched columns
        if self.session.current.is_root_container() != target.is_root_container() {
            cx.surface.set_row_count(0);
        }

        let path = target.as_path();
        let sort = cx
            .folders
            .sort_for(&path)
            .unwrap_or_else(|| cx.config.ui.sort_options());
        self.session.select = request.select;
        self.session.current = target.clone();
        self.session.sort = sort;

        if let Some((entries, raw)) = cx.tabs.active().and_then(|tab| tab.try_take(&path, &sort)) {
            self.trace(cx, NavPhase::SnapshotHit, entries.len());
            self.bind(cx, path, Listing { entries, raw }, sort);
            self.finish(cx);
            return;
        }

        self.session.state = NavState::Navigating;

        let tx = self.result_tx.clone();
        let cancel = self.session.cancel.clone();
        let shell = self.shell.clone();
        let show_hidden = cx.config.ui.show_hidden;
        let repaint = self.repaint.clone();
        let spawn_path = path;
        thread::spawn(move || {
            let result = match &target {
                NavTarget::Directory(dir) => read_directory(dir, show_hidden, &cancel)
                    .and_then(|raw| sort_listing(raw, &sort, &cancel)),
                NavTarget::RootContainer => {
                    sort_listing(shell.list_children(ROOT_CONTAINER), &sort, &cancel)
                }
                NavTarget::ShellItem(id) => sort_listing(shell.list_children(id), &sort, &cancel),
            };
            let _ = tx.send(EnumOutcome {
                generation,
                path: spawn_path,
                result,
            });
            if let Some(repaint) = repaint {
                repaint();
            }
        });
    }

    /// Shared by the snapshot-hit and fresh-load paths: replace the backing
    /// list, restore selection, refresh sibling snapshots, re-prime icons.
    fn bind(&mut self, cx: &mut NavContext, path: PathBuf, listing: Listing, sort: SortOptions) {
        let Listing {
            entries: ordered,
            raw,
        } = listing;
        let item_count = ordered.len();
        let explicit = std::mem::take(&mut self.session.select);
        let anchor = cx.tabs.active().map(|tab| tab.scroll_anchor).unwrap_or(0);

        let selected_rows = restore_selection(&ordered, &explicit, cx.folders, &path, anchor);
        let selected_paths: Vec<PathBuf> = selected_rows
            .iter()
            .map(|&row| ordered[row].path.clone())
            .collect();

        cx.surface.set_row_count(item_count);
        cx.surface.invalidate_region(0..item_count);
        cx.surface.select_rows(&selected_rows);
        if let Some(&row) = selected_rows.first() {
            cx.surface.focus_row(row);
        }

        // This path's content just re-synced; keep the other tabs' matching
        // snapshots correct without re-enumeration
        cx.tabs.refresh_snapshots(&path, &ordered, &raw, &sort);

        cx.folders.remember_sort(&path, sort);
        if selected_rows.len() == 1 {
            cx.folders
                .remember_selection(&path, &ordered[selected_rows[0]].name);
        }

        self.queue_icons(cx, &ordered);

        if let Some(tab) = cx.tabs.active_mut() {
            if !paths_eq_fold(&tab.current_path, &path) {
                tab.push_history(path.clone());
            }
            tab.update_label();
            tab.is_search_mode = false;
            tab.selected_index = selected_rows.first().copied();
            tab.selected_paths = selected_paths.iter().cloned().collect();
            tab.put(path, ordered, raw, sort);
        }

        if let Some(callback) = self.on_selection.as_mut() {
            callback(&selected_paths);
        }
        self.trace(cx, NavPhase::Bound, item_count);
    }

    /// Generic artwork first so every row paints quickly, then the
    /// content-specific thumbnails at low priority.
    fn queue_icons(&self, cx: &mut NavContext, entries: &[FileEntry]) {
        let generation = self.generation.load(Ordering::SeqCst);
        let colored = !cx.config.icons.grayscale;

        for entry in entries {
            cx.icons.enqueue(IconRequest::generic(
                generation,
                entry.icon_class(),
                &entry.extension,
                colored,
            ));
        }
        if cx.config.icons.show_thumbnails {
            for entry in entries {
                if entry.is_image() && !entry.is_dir {
                    cx.icons.enqueue(IconRequest::unique(
                        generation,
                        entry.path.clone(),
                        entry.icon_class(),
                        colored,
                        IconPriority::Low,
                    ));
                }
            }
        }
    }

    fn maybe_arm_retry(&mut self, cx: &mut NavContext, path: PathBuf) {
        let empty = cx
            .tabs
            .active()
            .map(|tab| tab.entries.is_empty())
            .unwrap_or(true);
        if self.session.pending.is_none() && empty {
            self.session.retry = Some(RetrySlot {
                path,
                deadline: Instant::now() + self.retry_delay,
            });
        }
    }

    /// Exit Navigating and immediately start the pending request, if any.
    fn finish(&mut self, cx: &mut NavContext) {
        self.session.state = NavState::Idle;
        if let Some(next) = self.session.pending.take() {
            self.begin(next, cx);
        }
    }

    fn title_for(&self, target: &NavTarget) -> String {
        match target {
            NavTarget::RootContainer => self.shell.display_name(ROOT_CONTAINER),
            NavTarget::ShellItem(id) => self.shell.display_name(id),
            NavTarget::Directory(path) => path.display().to_string(),
        }
    }

    fn trace(&self, cx: &mut NavContext, phase: NavPhase, item_count: usize) {
        cx.sink.trace(TraceEvent {
            nav_id: self.session.trace_id,
            phase,
            elapsed: self.session.started.elapsed(),
            item_count,
        });
    }
}

/// Strict restore priority: explicit paths (exact, then by name), the
/// folder's last-known selection, the previous scroll anchor, the first
/// item. Degrades to no selection without error.
fn restore_selection(
    ordered: &[FileEntry],
    explicit: &[PathBuf],
    folders: &FolderViewState,
    path: &Path,
    anchor: usize,
) -> Vec<usize> {
    let mut rows: Vec<usize> = Vec::new();

    for (row, entry) in ordered.iter().enumerate() {
        if explicit.iter().any(|p| paths_eq_fold(p, &entry.path)) {
            rows.push(row);
        }
    }

    if rows.is_empty() && !explicit.is_empty() {
        let names: Vec<String> = explicit
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_lowercase())
            .collect();
        for (row, entry) in ordered.iter().enumerate() {
            if names.contains(&entry.name.to_lowercase()) {
                rows.push(row);
            }
        }
    }

    if rows.is_empty() {
        if let Some(last) = folders.last_selection(path) {
            if let Some(row) = ordered
                .iter()
                .position(|entry| entry.name.eq_ignore_ascii_case(last))
            {
                rows.push(row);
            }
        }
    }

    if rows.is_empty() && !ordered.is_empty() {
        // Best-effort sweep: previous anchor if any, else the first item
        rows.push(anchor.min(ordered.len() - 1));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileEntry;

    fn listing(names: &[&str]) -> Vec<FileEntry> {
        names
            .iter()
            .map(|n| FileEntry::synthetic(*n, PathBuf::from(format!("/d/{n}")), false))
            .collect()
    }

    #[test]
    fn explicit_paths_win_over_last_selection() {
        let ordered = listing(&["a.txt", "b.txt", "c.txt"]);
        let mut folders = FolderViewState::new();
        folders.remember_selection(Path::new("/d"), "c.txt");

        let rows = restore_selection(
            &ordered,
            &[PathBuf::from("/d/b.txt")],
            &folders,
            Path::new("/d"),
            0,
        );
        assert_eq!(rows, vec![1]);
    }

    #[test]
    fn explicit_match_falls_back_to_name() {
        let ordered = listing(&["a.txt", "b.txt"]);
        let folders = FolderViewState::new();
        // Path from another directory, but the name exists here
        let rows = restore_selection(
            &ordered,
            &[PathBuf::from("/elsewhere/b.txt")],
            &folders,
            Path::new("/d"),
            0,
        );
        assert_eq!(rows, vec![1]);
    }

    #[test]
    fn last_selection_beats_first_item() {
        let ordered = listing(&["a.txt", "b.txt", "c.txt"]);
        let mut folders = FolderViewState::new();
        folders.remember_selection(Path::new("/d"), "C.TXT");

        let rows = restore_selection(&ordered, &[], &folders, Path::new("/d"), 0);
        assert_eq!(rows, vec![2]);
    }

    #[test]
    fn empty_list_degrades_to_no_selection() {
        let folders = FolderViewState::new();
        let rows = restore_selection(&[], &[PathBuf::from("/d/x")], &folders, Path::new("/d"), 5);
        assert!(rows.is_empty());
    }

    #[test]
    fn anchor_is_clamped_into_the_new_list() {
        let ordered = listing(&["a.txt", "b.txt"]);
        let folders = FolderViewState::new();
        let rows = restore_selection(&ordered, &[], &folders, Path::new("/d"), 40);
        assert_eq!(rows, vec![1]);
    }

    use crate::icons::IconResolver;
    use crate::io::DeviceRoots;
    use crate::surface::NullSurface;
    use crate::trace::LogSink;

    struct Fixture {
        tabs: TabsManager,
        folders: FolderViewState,
        icons: IconPipeline,
        surface: NullSurface,
        sink: LogSink,
        config: Config,
    }

    impl Fixture {
        fn new(generation: Arc<AtomicU64>) -> Self {
            let resolver = IconResolver {
                thumbnails_enabled: false,
                use_system_icons: false,
                small_px: 4,
                large_px: 8,
            };
            Self {
                tabs: TabsManager::new(PathBuf::from("/")),
                folders: FolderViewState::new(),
                icons: IconPipeline::new(resolver, generation, None),
                surface: NullSurface,
                sink: LogSink,
                config: Config::default(),
            }
        }

        fn cx(&mut self) -> NavContext<'_> {
            NavContext {
                tabs: &mut self.tabs,
                folders: &mut self.folders,
                icons: &self.icons,
                surface: &mut self.surface,
                sink: &mut self.sink,
                config: &self.config,
            }
        }
    }

    #[test]
    fn armed_retry_is_superseded_by_navigation() {
        let generation = Arc::new(AtomicU64::new(0));
        let mut fixture = Fixture::new(generation.clone());
        let mut engine = NavEngine::new(Arc::new(DeviceRoots), generation, None);

        engine.maybe_arm_retry(&mut fixture.cx(), PathBuf::from("/gone"));
        assert!(engine.retry_armed_for(Path::new("/gone")));

        engine.navigate_to(
            NavigationRequest::to_path(std::env::temp_dir()),
            &mut fixture.cx(),
        );
        assert!(!engine.retry_armed_for(Path::new("/gone")));
    }

    #[test]
    fn retry_does_not_arm_while_a_request_is_queued() {
        let generation = Arc::new(AtomicU64::new(0));
        let mut fixture = Fixture::new(generation.clone());
        let mut engine = NavEngine::new(Arc::new(DeviceRoots), generation, None);

        engine.session.pending = Some(NavigationRequest::to_path("/next"));
        engine.maybe_arm_retry(&mut fixture.cx(), PathBuf::from("/gone"));
        assert!(!engine.retry_armed_for(Path::new("/gone")));
    }

    #[test]
    fn pending_slot_keeps_only_the_latest_request() {
        let generation = Arc::new(AtomicU64::new(0));
        let mut fixture = Fixture::new(generation.clone());
        let mut engine = NavEngine::new(Arc::new(DeviceRoots), generation, None);

        engine.session.state = NavState::Navigating;
        engine.navigate_to(NavigationRequest::to_path("/r1"), &mut fixture.cx());
        engine.navigate_to(NavigationRequest::to_path("/r2"), &mut fixture.cx());

        let pending = engine.session.pending.as_ref().expect("pending slot filled");
        assert_eq!(pending.target, NavTarget::Directory(PathBuf::from("/r2")));
        assert!(engine.session.cancel.is_cancelled());
    }
}
