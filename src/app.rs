// Thin egui chrome around the navigation core

use crate::config::Config;
use crate::icons::{generic_key, IconCache, IconPipeline, IconResolver};
use crate::io::{DirWatcher, DeviceRoots, RepaintHandle};
use crate::nav::{NavContext, NavEngine, NavigationRequest};
use crate::state::folder_view::paths_eq_fold;
use crate::state::sort::Column;
use crate::state::{FolderViewState, TabsManager};
use crate::surface::DisplaySurface;
use crate::trace::StatusSink;
use chrono::{DateTime, Local};
use eframe::egui;
use std::collections::HashMap;
use std::ops::Range;
use std::path::PathBuf;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Instant;

const MESSAGE_TIMEOUT_SECS: u64 = 5;
const FLUSH_BUDGET: usize = 16;
const ROW_HEIGHT: f32 = 22.0;

/// Row-list state the engine binds into; egui redraws everything each
/// frame, so tracking counts and selection is all the surface needs.
#[derive(Default)]
pub struct ChromeSurface {
    pub rows: usize,
    pub selected: Vec<usize>,
    pub focused: Option<usize>,
}

impl DisplaySurface for ChromeSurface {
    fn set_row_count(&mut self, rows: usize) {
        self.rows = rows;
        self.selected.clear();
        self.focused = None;
    }

    fn invalidate_region(&mut self, _rows: Range<usize>) {}

    fn select_rows(&mut self, rows: &[usize]) {
        self.selected = rows.to_vec();
    }

    fn focus_row(&mut self, row: usize) {
        self.focused = Some(row);
    }
}

/// Title and transient status line with timeout expiry.
#[derive(Default)]
pub struct ChromeSink {
    pub title: String,
    pub message: Option<(String, Instant)>,
}

impl ChromeSink {
    fn clear_expired(&mut self) {
        if let Some((_, at)) = &self.message {
            if at.elapsed().as_secs() >= MESSAGE_TIMEOUT_SECS {
                self.message = None;
            }
        }
    }
}

impl StatusSink for ChromeSink {
    fn status(&mut self, message: &str) {
        log::info!("{}", message);
        self.message = Some((message.to_string(), Instant::now()));
    }

    fn title(&mut self, text: &str) {
        self.title = text.to_string();
    }
}

pub struct PloverApp {
    config: Config,
    engine: NavEngine,
    tabs: TabsManager,
    folders: FolderViewState,
    icons: IconPipeline,
    cache: IconCache,
    watcher: Option<DirWatcher>,
    watched: Option<PathBuf>,
    surface: ChromeSurface,
    sink: ChromeSink,
    textures: HashMap<String, egui::TextureHandle>,
}

impl PloverApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = Config::load();
        let ctx = cc.egui_ctx.clone();
        let repaint: RepaintHandle = Arc::new(move || ctx.request_repaint());

        let generation = Arc::new(AtomicU64::new(0));
        let icons = IconPipeline::new(
            IconResolver::from_config(&config.icons),
            generation.clone(),
            Some(repaint.clone()),
        );
        let engine = NavEngine::new(Arc::new(DeviceRoots), generation, Some(repaint.clone()));

        let start_path = directories::UserDirs::new()
            .map(|ud| ud.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("/"));
        let tabs = TabsManager::new(start_path.clone());
        let watcher = DirWatcher::new(Some(repaint)).ok();

        let mut app = Self {
            config,
            engine,
            tabs,
            folders: FolderViewState::new(),
            icons,
            cache: IconCache::new(),
            watcher,
            watched: None,
            surface: ChromeSurface::default(),
            sink: ChromeSink::default(),
            textures: HashMap::new(),
        };
        app.navigate(start_path);
        app
    }

    fn navigate(&mut self, path: PathBuf) {
        let request = NavigationRequest::to_path(path);
        let mut cx = NavContext {
            tabs: &mut self.tabs,
            folders: &mut self.folders,
            icons: &self.icons,
            surface: &mut self.surface,
            sink: &mut self.sink,
            config: &self.config,
        };
        self.engine.navigate_to(request, &mut cx);
    }

    fn poll(&mut self) {
        let mut cx = NavContext {
            tabs: &mut self.tabs,
            folders: &mut self.folders,
            icons: &self.icons,
            surface: &mut self.surface,
            sink: &mut self.sink,
            config: &self.config,
        };
        self.engine.poll(&mut cx);
    }

    fn drain_watcher(&mut self) {
        let Some(watcher) = &self.watcher else { return };
        let mut resync: Option<PathBuf> = None;
        while let Some(dir) = watcher.try_recv() {
            let matches_active = self
                .tabs
                .active()
                .map(|tab| paths_eq_fold(&tab.current_path, &dir))
                .unwrap_or(false);
            if matches_active {
                resync = Some(dir);
            }
        }
        if let Some(dir) = resync {
            // Force a real re-enumeration instead of a snapshot hit
            if let Some(tab) = self.tabs.active_mut() {
                tab.mark_stale();
            }
            self.navigate(dir);
        }
    }

    fn update_watch(&mut self) {
        let Some(current) = self.tabs.active().map(|tab| tab.current_path.clone()) else {
            return;
        };
        let changed = self
            .watched
            .as_ref()
            .map(|w| !paths_eq_fold(w, &current))
            .unwrap_or(true);
        if changed && current.is_dir() {
            if let Some(watcher) = &mut self.watcher {
                watcher.watch(&current);
            }
            self.watched = Some(current);
        }
    }

    fn texture_for(&mut self, ctx: &egui::Context, key: &str, fallback: &str) -> Option<egui::TextureId> {
        let slot_key = if self.cache.contains(key) {
            key
        } else if self.cache.contains(fallback) {
            fallback
        } else {
            return None;
        };
        if let Some(handle) = self.textures.get(slot_key) {
            return Some(handle.id());
        }
        let slot = self.cache.get(slot_key)?;
        let (w, h) = slot.small.dimensions();
        let color = egui::ColorImage::from_rgba_unmultiplied(
            [w as usize, h as usize],
            slot.small.as_raw(),
        );
        let handle = ctx.load_texture(slot_key.to_string(), color, egui::TextureOptions::LINEAR);
        let id = handle.id();
        self.textures.insert(slot_key.to_string(), handle);
        Some(id)
    }

    fn click_header(&mut self, column: Column) {
        let Some(tab) = self.tabs.active() else { return };
        let path = tab.current_path.clone();
        let mut sort = tab.sort;
        sort.click_column(column);
        self.folders.remember_sort(&path, sort);
        if let Some(tab) = self.tabs.active_mut() {
            tab.mark_stale();
        }
        self.navigate(path);
    }

    fn tab_strip(&mut self, ui: &mut egui::Ui) {
        let mut switch_to: Option<usize> = None;
        let mut close: Option<usize> = None;
        ui.horizontal(|ui| {
            for (i, tab) in self.tabs.tabs.iter().enumerate() {
                let selected = i == self.tabs.active_tab;
                if ui.selectable_label(selected, &tab.label).clicked() {
                    switch_to = Some(i);
                }
                if selected && self.tabs.tab_count() > 1 && ui.small_button("x").clicked() {
                    close = Some(i);
                }
            }
            if ui.small_button("+").clicked() {
                if let Some(path) = self.tabs.active().map(|t| t.current_path.clone()) {
                    self.tabs.new_tab(path);
                }
            }
        });
        if let Some(i) = close {
            self.tabs.close_tab(i);
            switch_to = Some(self.tabs.active_tab);
        }
        if let Some(i) = switch_to {
            self.tabs.switch_to_tab(i);
            if let Some(path) = self.tabs.active().map(|t| t.current_path.clone()) {
                // Snapshot hit makes this instant when the listing is cached
                self.navigate(path);
            }
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("\u{2190}").clicked() {
                if let Some(path) = self.tabs.active_mut().and_then(|t| t.go_back()) {
                    self.navigate(path);
                }
            }
            if ui.button("\u{2192}").clicked() {
                if let Some(path) = self.tabs.active_mut().and_then(|t| t.go_forward()) {
                    self.navigate(path);
                }
            }
            if ui.button("\u{2191}").clicked() {
                let parent = self
                    .tabs
                    .active()
                    .and_then(|t| t.current_path.parent().map(|p| p.to_path_buf()));
                if let Some(path) = parent {
                    self.navigate(path);
                }
            }
            ui.label(&self.sink.title);
        });
    }

    fn header_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for (label, column) in [
                ("Name", Column::Name),
                ("Size", Column::Size),
                ("Modified", Column::Modified),
                ("Type", Column::Extension),
                ("Tags", Column::Tags),
            ] {
                if ui.button(label).clicked() {
                    self.click_header(column);
                }
            }
        });
    }

    fn listing(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let total = self.tabs.active().map(|t| t.entries.len()).unwrap_or(0);
        let mut clicked: Option<usize> = None;
        let mut activated: Option<usize> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show_rows(ui, ROW_HEIGHT, total, |ui, range| {
                if let Some(tab) = self.tabs.active_mut() {
                    tab.scroll_anchor = range.start;
                }
                for row in range {
                    let Some(entry) = self.tabs.active().and_then(|t| t.entries.get(row)).cloned()
                    else {
                        continue;
                    };
                    let selected = self.surface.selected.contains(&row);
                    let colored = !self.config.icons.grayscale;
                    let unique_key = entry.path.to_string_lossy().to_string();
                    let fallback = generic_key(entry.icon_class(), &entry.extension, colored);
                    let texture = self.texture_for(ctx, &unique_key, &fallback);

                    let response = ui.horizontal(|ui| {
                        match texture {
                            Some(id) => {
                                let size = self.config.icons.icon_size as f32;
                                ui.image((id, egui::vec2(size, size)));
                            }
                            None => {
                                ui.label(entry.glyph());
                            }
                        }
                        let label = ui.selectable_label(selected, entry.display_name());
                        let size_text = if entry.is_dir {
                            "DIR".to_string()
                        } else {
                            bytesize::ByteSize::b(entry.size).to_string()
                        };
                        ui.label(size_text);
                        let modified: DateTime<Local> = entry.modified.into();
                        ui.label(modified.format("%Y-%m-%d %H:%M").to_string());
                        label
                    });

                    let label = response.inner;
                    if label.double_clicked() {
                        activated = Some(row);
                    } else if label.clicked() {
                        clicked = Some(row);
                    }
                }
            });

        if let Some(row) = clicked {
            self.surface.selected = vec![row];
            self.surface.focused = Some(row);
            if let Some((path, name)) = self.tabs.active().and_then(|t| {
                t.entries
                    .get(row)
                    .map(|e| (t.current_path.clone(), e.name.clone()))
            }) {
                self.folders.remember_selection(&path, &name);
            }
            if let Some(tab) = self.tabs.active_mut() {
                tab.selected_index = Some(row);
            }
        }
        if let Some(row) = activated {
            let entry = self.tabs.active().and_then(|t| t.entries.get(row)).cloned();
            if let Some(entry) = entry {
                if entry.is_dir {
                    self.navigate(entry.path);
                } else if let Err(e) = open::that(&entry.path) {
                    self.sink.status(&format!("Failed to open: {}", e));
                }
            }
        }
    }

    fn status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let count = self.tabs.active().map(|t| t.entries.len()).unwrap_or(0);
            ui.label(format!("Items: {}", count));
            if let Some((message, _)) = &self.sink.message {
                ui.separator();
                ui.label(message);
            }
        });
    }
}

impl eframe::App for PloverApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sink.clear_expired();
        self.drain_watcher();
        self.poll();
        for key in self.icons.flush_ready(&mut self.cache, FLUSH_BUDGET) {
            // A replaced cache slot invalidates any texture built from it
            self.textures.remove(&key);
        }
        self.update_watch();

        egui::TopBottomPanel::top("chrome").show(ctx, |ui| {
            self.tab_strip(ui);
            self.toolbar(ui);
            self.header_row(ui);
        });
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.status_bar(ui);
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.listing(ui, ctx);
        });
    }
}
