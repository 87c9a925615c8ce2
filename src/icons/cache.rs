// Icon cache - one small and one large image per key

use image::RgbaImage;
use std::collections::HashMap;

pub struct IconSlot {
    pub small: RgbaImage,
    pub large: RgbaImage,
}

/// Keyed store of resolved icon artwork. A slot owns both resolutions once
/// inserted. Inserts are idempotent: an occupied slot is never overwritten,
/// callers that need replacement remove the old entry first.
#[derive(Default)]
pub struct IconCache {
    slots: HashMap<String, IconSlot>,
}

impl IconCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    /// Returns false and drops the images if the slot is already populated.
    pub fn insert(&mut self, key: String, small: RgbaImage, large: RgbaImage) -> bool {
        if self.slots.contains_key(&key) {
            return false;
        }
        self.slots.insert(key, IconSlot { small, large });
        true
    }

    pub fn remove(&mut self, key: &str) -> Option<IconSlot> {
        self.slots.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&IconSlot> {
        self.slots.get(key)
    }

    /// Lookup with in-place fallback: the content-specific slot if present,
    /// else the shared generic slot.
    pub fn lookup(&self, key: &str, fallback: &str) -> Option<&IconSlot> {
        self.slots.get(key).or_else(|| self.slots.get(fallback))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(v: u8) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, image::Rgba([v, v, v, 255]))
    }

    #[test]
    fn insert_is_first_writer_wins() {
        let mut cache = IconCache::new();
        assert!(cache.insert("color_.png".into(), px(1), px(1)));
        assert!(!cache.insert("color_.png".into(), px(9), px(9)));
        assert_eq!(cache.get("color_.png").unwrap().small.get_pixel(0, 0)[0], 1);
    }

    #[test]
    fn unique_replacement_goes_through_remove() {
        let mut cache = IconCache::new();
        assert!(cache.insert("/a/img1.png".into(), px(1), px(1)));
        assert!(cache.remove("/a/img1.png").is_some());
        assert!(cache.insert("/a/img1.png".into(), px(9), px(9)));
        assert_eq!(cache.get("/a/img1.png").unwrap().small.get_pixel(0, 0)[0], 9);
    }

    #[test]
    fn lookup_falls_back_to_generic_slot() {
        let mut cache = IconCache::new();
        cache.insert("color_.png".into(), px(3), px(3));
        let slot = cache.lookup("/a/img1.png", "color_.png").unwrap();
        assert_eq!(slot.small.get_pixel(0, 0)[0], 3);
        assert!(cache.lookup("/a/img2.png", "color_folder").is_none());
    }
}
