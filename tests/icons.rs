// Icon pipeline integration: worker, generation discard and cache hand-off.

use image::{Rgba, RgbaImage};
use plover::entry::IconClass;
use plover::icons::{IconCache, IconPipeline, IconPriority, IconRequest, IconResolver};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn resolver(thumbnails: bool) -> IconResolver {
    IconResolver {
        thumbnails_enabled: thumbnails,
        use_system_icons: true,
        small_px: 6,
        large_px: 12,
    }
}

/// Wait until the worker has consumed everything it was handed.
fn wait_quiescent(pipeline: &IconPipeline) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if pipeline.pending_len() == 0 && pipeline.queue_depths() == (0, 0) {
            return;
        }
        assert!(Instant::now() < deadline, "worker never drained its queues");
        thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn generic_request_resolves_once_into_the_cache() {
    let generation = Arc::new(AtomicU64::new(3));
    let pipeline = IconPipeline::new(resolver(false), generation, None);

    let request = IconRequest::generic(3, IconClass::Image, "png", false);
    pipeline.enqueue(request.clone());
    pipeline.enqueue(request);
    wait_quiescent(&pipeline);
    assert!(pipeline.ready_len() >= 1);

    let mut cache = IconCache::new();
    pipeline.flush_ready(&mut cache, 64);
    assert_eq!(cache.len(), 1);
    let slot = cache.get("gray_.png").unwrap();
    assert_eq!(slot.small.dimensions(), (6, 6));
    assert_eq!(slot.large.dimensions(), (12, 12));

    // A later duplicate resolves again but never disturbs the occupied slot,
    // and the flush reports no change
    pipeline.enqueue(IconRequest::generic(3, IconClass::Image, "png", false));
    wait_quiescent(&pipeline);
    assert!(pipeline.flush_ready(&mut cache, 64).is_empty());
    assert_eq!(cache.len(), 1);
}

#[test]
fn stale_generation_results_are_discarded_not_applied() {
    let generation = Arc::new(AtomicU64::new(1));
    let pipeline = IconPipeline::new(resolver(false), generation.clone(), None);

    pipeline.enqueue(IconRequest::generic(1, IconClass::Folder, "", true));
    // A navigation lands before the icon is consumed
    generation.fetch_add(1, Ordering::SeqCst);
    wait_quiescent(&pipeline);

    let mut cache = IconCache::new();
    let applied = pipeline.flush_ready(&mut cache, 64);
    assert!(applied.is_empty());
    assert!(cache.is_empty());
}

#[test]
fn content_thumbnail_lands_under_the_unique_key() {
    let tmp = TempDir::new().unwrap();
    let img_path = tmp.path().join("img1.png");
    RgbaImage::from_pixel(10, 10, Rgba([200, 10, 10, 255]))
        .save(&img_path)
        .unwrap();

    let generation = Arc::new(AtomicU64::new(1));
    let pipeline = IconPipeline::new(resolver(true), generation, None);
    pipeline.enqueue(IconRequest::unique(
        1,
        img_path.clone(),
        IconClass::Image,
        true,
        IconPriority::Low,
    ));
    wait_quiescent(&pipeline);

    let mut cache = IconCache::new();
    assert_eq!(pipeline.flush_ready(&mut cache, 8).len(), 1);
    let slot = cache
        .get(img_path.to_string_lossy().as_ref())
        .expect("thumbnail cached under the full path");
    assert_eq!(slot.small.dimensions(), (6, 6));
    assert_eq!(slot.large.dimensions(), (12, 12));
}

#[test]
fn unreadable_source_still_fills_both_resolutions() {
    let generation = Arc::new(AtomicU64::new(1));
    let pipeline = IconPipeline::new(resolver(true), generation, None);

    // No file on disk: the thumbnail tier fails and generic artwork steps in
    pipeline.enqueue(IconRequest::unique(
        1,
        PathBuf::from("/definitely/not/here.png"),
        IconClass::Image,
        true,
        IconPriority::Low,
    ));
    wait_quiescent(&pipeline);

    let mut cache = IconCache::new();
    pipeline.flush_ready(&mut cache, 8);
    let slot = cache.get("/definitely/not/here.png").unwrap();
    assert_eq!(slot.small.dimensions(), (6, 6));
    assert_eq!(slot.large.dimensions(), (12, 12));
}

#[test]
fn high_priority_generic_preempts_queued_thumbnails() {
    let tmp = TempDir::new().unwrap();
    let mut thumbs = Vec::new();
    for i in 0..16 {
        let path = tmp.path().join(format!("pic{i}.png"));
        RgbaImage::from_pixel(10, 10, Rgba([10, 10, 200, 255]))
            .save(&path)
            .unwrap();
        thumbs.push(path);
    }

    let generation = Arc::new(AtomicU64::new(1));
    let pipeline = IconPipeline::new(resolver(true), generation, None);
    for path in thumbs {
        pipeline.enqueue(IconRequest::unique(
            1,
            path,
            IconClass::Image,
            true,
            IconPriority::Low,
        ));
    }
    pipeline.enqueue(IconRequest::generic(1, IconClass::Folder, "", true));
    wait_quiescent(&pipeline);

    // Flushing one entry at a time preserves resolution order; the generic
    // icon must not sit behind the whole thumbnail backlog
    let mut cache = IconCache::new();
    let mut thumbs_before_generic = 0;
    loop {
        let applied = pipeline.flush_ready(&mut cache, 1);
        let Some(key) = applied.first() else { break };
        if key == "color_folder" {
            break;
        }
        thumbs_before_generic += 1;
    }
    assert!(cache.contains("color_folder"), "generic icon never resolved");
    assert!(
        thumbs_before_generic < 16,
        "generic icon starved behind {thumbs_before_generic} thumbnails"
    );
}

#[test]
fn replaced_unique_slot_is_reported_to_the_caller() {
    let tmp = TempDir::new().unwrap();
    let img_path = tmp.path().join("img1.png");
    RgbaImage::from_pixel(10, 10, Rgba([20, 180, 20, 255]))
        .save(&img_path)
        .unwrap();
    let key = img_path.to_string_lossy().to_string();

    let generation = Arc::new(AtomicU64::new(1));
    let pipeline = IconPipeline::new(resolver(true), generation, None);
    let request = IconRequest::unique(1, img_path, IconClass::Image, true, IconPriority::Low);

    pipeline.enqueue(request.clone());
    wait_quiescent(&pipeline);
    let mut cache = IconCache::new();
    assert_eq!(pipeline.flush_ready(&mut cache, 8), vec![key.clone()]);

    // Re-delivery replaces the slot and must be reported again so any
    // derived artwork gets rebuilt
    pipeline.enqueue(request);
    wait_quiescent(&pipeline);
    assert_eq!(pipeline.flush_ready(&mut cache, 8), vec![key.clone()]);
    assert_eq!(cache.len(), 1);
    assert!(cache.contains(&key));
}

#[test]
fn cancel_pending_drops_queued_work() {
    let generation = Arc::new(AtomicU64::new(1));
    let pipeline = IconPipeline::new(resolver(false), generation, None);

    for i in 0..32 {
        pipeline.enqueue(IconRequest::generic(1, IconClass::File, &format!("e{i}"), true));
    }
    pipeline.cancel_pending();

    assert_eq!(pipeline.queue_depths(), (0, 0));
    // The worker may hold at most its single in-flight reservation
    assert!(pipeline.pending_len() <= 1);
}
