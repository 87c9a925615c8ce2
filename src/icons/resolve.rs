// Icon resolution - thumbnail, generic and placeholder tiers

use crate::config::IconConfig;
use crate::entry::IconClass;
use crate::icons::IconRequest;
use image::{imageops, imageops::FilterType, Rgba, RgbaImage};

const GLYPH_BASE_PX: u32 = 32;

pub struct IconResolver {
    pub thumbnails_enabled: bool,
    pub use_system_icons: bool,
    pub small_px: u32,
    pub large_px: u32,
}

impl IconResolver {
    pub fn from_config(cfg: &IconConfig) -> Self {
        Self {
            thumbnails_enabled: cfg.show_thumbnails,
            use_system_icons: cfg.use_system_icons,
            small_px: cfg.icon_size.max(1),
            large_px: cfg.thumbnail_size.max(1),
        }
    }

    pub fn is_thumbnail_candidate(&self, req: &IconRequest) -> bool {
        self.thumbnails_enabled && req.unique && req.class == IconClass::Image
    }

    /// Fallback chain: content thumbnail, then generic artwork, then a
    /// resampled placeholder glyph. Always yields both resolutions or
    /// nothing; a small image without a large counterpart is upscaled
    /// rather than re-resolved.
    pub fn resolve(&self, req: &IconRequest) -> Option<(RgbaImage, RgbaImage)> {
        if self.is_thumbnail_candidate(req) {
            if let Some(pair) = self.thumbnail_pair(req) {
                return Some(pair);
            }
        }
        if self.use_system_icons {
            if let Some(pair) = self.generic_pair(req) {
                return Some(pair);
            }
        }
        self.placeholder_pair(req)
    }

    fn thumbnail_pair(&self, req: &IconRequest) -> Option<(RgbaImage, RgbaImage)> {
        let decoded = image::open(&req.lookup_path).ok()?.to_rgba8();
        let small = imageops::thumbnail(&decoded, self.small_px, self.small_px);
        let large = imageops::thumbnail(&decoded, self.large_px, self.large_px);
        Some((small, large))
    }

    fn generic_pair(&self, req: &IconRequest) -> Option<(RgbaImage, RgbaImage)> {
        let base = glyph_tile(req.class, req.colored);
        let small = resample(&base, self.small_px);
        // Large loading is skipped for cost; upscale the small result
        let large = resample(&small, self.large_px);
        Some((small, large))
    }

    fn placeholder_pair(&self, req: &IconRequest) -> Option<(RgbaImage, RgbaImage)> {
        let base = flat_tile(req.class, req.colored);
        let small = resample(&base, self.small_px);
        let large = resample(&small, self.large_px);
        Some((small, large))
    }
}

fn resample(src: &RgbaImage, px: u32) -> RgbaImage {
    imageops::resize(src, px, px, FilterType::Triangle)
}

fn class_color(class: IconClass, colored: bool) -> Rgba<u8> {
    let rgb: [u8; 3] = match class {
        IconClass::Folder => [235, 170, 50],
        IconClass::File => [180, 185, 190],
        IconClass::Image => [70, 160, 170],
    };
    if colored {
        Rgba([rgb[0], rgb[1], rgb[2], 255])
    } else {
        let v = ((rgb[0] as u16 + rgb[1] as u16 + rgb[2] as u16) / 3) as u8;
        Rgba([v, v, v, 255])
    }
}

/// Drawn glyph for the generic tier: folder with a tab, file with a corner
/// fold, image with a horizon band.
fn glyph_tile(class: IconClass, colored: bool) -> RgbaImage {
    let fill = class_color(class, colored);
    let accent = Rgba([250, 250, 250, 255]);
    let n = GLYPH_BASE_PX;
    let mut img = RgbaImage::from_pixel(n, n, Rgba([0, 0, 0, 0]));

    for y in 0..n {
        for x in 0..n {
            let inside = match class {
                IconClass::Folder => y >= 6 || (y >= 2 && x < n / 2),
                _ => x >= 2 && x < n - 2,
            };
            if inside {
                img.put_pixel(x, y, fill);
            }
        }
    }
    match class {
        IconClass::File => {
            // corner fold, top right
            for y in 0..8 {
                for x in (n - 10)..(n - 2) {
                    if x + y >= n - 3 {
                        img.put_pixel(x, y, accent);
                    }
                }
            }
        }
        IconClass::Image => {
            for y in (n - 12)..(n - 4) {
                for x in 2..(n - 2) {
                    img.put_pixel(x, y, accent);
                }
            }
        }
        IconClass::Folder => {}
    }
    img
}

/// Last-resort placeholder: a flat tile in the class color.
fn flat_tile(class: IconClass, colored: bool) -> RgbaImage {
    RgbaImage::from_pixel(GLYPH_BASE_PX, GLYPH_BASE_PX, class_color(class, colored))
}
