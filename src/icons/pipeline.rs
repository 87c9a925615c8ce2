// Icon loading pipeline - priority queues, one worker, batched delivery

use crate::icons::cache::IconCache;
use crate::icons::resolve::IconResolver;
use crate::icons::{IconPriority, IconRequest};
use crate::io::RepaintHandle;
use image::RgbaImage;
use parking_lot::{Condvar, Mutex};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

// Bounded idle wait so shutdown is never delayed indefinitely
const IDLE_WAIT: Duration = Duration::from_millis(200);

/// A completed resolution awaiting hand-off to the cache.
pub struct ReadyIcon {
    pub generation: u64,
    pub key: String,
    pub unique: bool,
    pub small: RgbaImage,
    pub large: RgbaImage,
}

#[derive(Default)]
struct Queues {
    high: VecDeque<IconRequest>,
    low: VecDeque<IconRequest>,
    pending: HashSet<String>,
}

impl Queues {
    /// Admit a request unless its key is already pending. Returns whether
    /// the request was queued.
    fn offer(&mut self, request: IconRequest) -> bool {
        if !self.pending.insert(request.key.clone()) {
            return false;
        }
        match request.priority {
            IconPriority::High => self.high.push_back(request),
            IconPriority::Low => self.low.push_back(request),
        }
        true
    }
}

struct Shared {
    queues: Mutex<Queues>,
    signal: Condvar,
    generation: Arc<AtomicU64>,
    shutdown: AtomicBool,
    ready: Mutex<VecDeque<ReadyIcon>>,
    flush_scheduled: AtomicBool,
}

pub struct IconPipeline {
    shared: Arc<Shared>,
    repaint: Option<RepaintHandle>,
    worker: Option<JoinHandle<()>>,
}

impl IconPipeline {
    /// `generation` is the navigation session's counter; work tagged with an
    /// older value is discarded at every hand-off.
    pub fn new(
        resolver: IconResolver,
        generation: Arc<AtomicU64>,
        repaint: Option<RepaintHandle>,
    ) -> Self {
        let shared = Arc::new(Shared {
            queues: Mutex::new(Queues::default()),
            signal: Condvar::new(),
            generation,
            shutdown: AtomicBool::new(false),
            ready: Mutex::new(VecDeque::new()),
            flush_scheduled: AtomicBool::new(false),
        });

        let worker_shared = shared.clone();
        let worker_repaint = repaint.clone();
        let worker = thread::spawn(move || worker_loop(worker_shared, resolver, worker_repaint));

        Self {
            shared,
            repaint,
            worker: Some(worker),
        }
    }

    /// Queue a resolution job. A request whose key is already pending is
    /// dropped, not re-queued.
    pub fn enqueue(&self, request: IconRequest) {
        if self.shared.queues.lock().offer(request) {
            self.shared.signal.notify_one();
        }
    }

    /// Drop all queued requests. The in-flight one (if any) keeps its
    /// pending-key reservation and is invalidated by generation instead.
    pub fn cancel_pending(&self) {
        let mut guard = self.shared.queues.lock();
        let queues = &mut *guard;
        for request in queues.high.drain(..).chain(queues.low.drain(..)) {
            queues.pending.remove(&request.key);
        }
    }

    /// Apply up to `budget` completed icons to the cache on the caller's
    /// (UI-owned) thread. Generic slots are first-writer-wins; unique slots
    /// are replaced through remove-then-insert. Stale generations are
    /// dropped. Returns the keys whose slot content changed, so the display
    /// layer can drop anything it derived from the old images.
    pub fn flush_ready(&self, cache: &mut IconCache, budget: usize) -> Vec<String> {
        let current = self.shared.generation.load(Ordering::SeqCst);
        let mut applied = Vec::new();

        for _ in 0..budget {
            let icon = match self.shared.ready.lock().pop_front() {
                Some(icon) => icon,
                None => break,
            };
            if icon.generation != current {
                continue;
            }
            if icon.unique {
                cache.remove(&icon.key);
                let key = icon.key.clone();
                cache.insert(icon.key, icon.small, icon.large);
                applied.push(key);
            } else if !cache.contains(&icon.key) {
                let key = icon.key.clone();
                cache.insert(icon.key, icon.small, icon.large);
                applied.push(key);
            }
            // Rejected images are dropped here, never handed to the cache
        }

        if self.shared.ready.lock().is_empty() {
            self.shared.flush_scheduled.store(false, Ordering::SeqCst);
        } else if let Some(repaint) = &self.repaint {
            // Budget exhausted with work left: reschedule
            repaint();
        }
        applied
    }

    pub fn queue_depths(&self) -> (usize, usize) {
        let queues = self.shared.queues.lock();
        (queues.high.len(), queues.low.len())
    }

    pub fn pending_len(&self) -> usize {
        self.shared.queues.lock().pending.len()
    }

    pub fn ready_len(&self) -> usize {
        self.shared.ready.lock().len()
    }
}

impl Drop for IconPipeline {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        self.shared.signal.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: Arc<Shared>, resolver: IconResolver, repaint: Option<RepaintHandle>) {
    loop {
        if shared.shutdown.load(Ordering::SeqCst) {
            break;
        }

        let request = {
            let mut queues = shared.queues.lock();
            match queues.high.pop_front().or_else(|| queues.low.pop_front()) {
                Some(request) => request,
                None => {
                    shared.signal.wait_for(&mut queues, IDLE_WAIT);
                    continue;
                }
            }
        };

        // Stale before any expensive work
        if request.generation != shared.generation.load(Ordering::SeqCst) {
            shared.queues.lock().pending.remove(&request.key);
            continue;
        }

        let resolved = resolver.resolve(&request);

        // Re-check after the expensive part; a navigation may have landed
        if request.generation != shared.generation.load(Ordering::SeqCst) {
            shared.queues.lock().pending.remove(&request.key);
            continue;
        }

        let Some((small, large)) = resolved else {
            log::debug!("icon resolution dropped for {}", request.key);
            shared.queues.lock().pending.remove(&request.key);
            continue;
        };

        // Deliver before releasing the key reservation, so an empty pending
        // set means every accepted result has reached the ready queue
        let key = request.key.clone();
        shared.ready.lock().push_back(ReadyIcon {
            generation: request.generation,
            key: request.key,
            unique: request.unique,
            small,
            large,
        });
        shared.queues.lock().pending.remove(&key);

        // At most one flush in flight on the UI side
        if !shared.flush_scheduled.swap(true, Ordering::SeqCst) {
            if let Some(repaint) = &repaint {
                repaint();
            }
        }
    }
}
