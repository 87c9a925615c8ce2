pub mod cache;
pub mod pipeline;
pub mod resolve;

use crate::entry::IconClass;
use std::path::PathBuf;

pub use cache::{IconCache, IconSlot};
pub use pipeline::{IconPipeline, ReadyIcon};
pub use resolve::IconResolver;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconPriority {
    High,
    Low,
}

/// One icon resolution job. `key` names the cache slot: a full path for
/// content-specific ("unique") artwork, or a shared generic key of the form
/// `<colorspace>_<extension>`. Requests are de-duplicated by key while
/// pending.
#[derive(Clone, Debug)]
pub struct IconRequest {
    pub generation: u64,
    pub key: String,
    pub lookup_path: PathBuf,
    pub class: IconClass,
    pub colored: bool,
    pub priority: IconPriority,
    pub unique: bool,
}

impl IconRequest {
    /// Shared artwork for every item of the same class or extension.
    pub fn generic(generation: u64, class: IconClass, extension: &str, colored: bool) -> Self {
        Self {
            generation,
            key: generic_key(class, extension, colored),
            lookup_path: PathBuf::new(),
            class,
            colored,
            priority: IconPriority::High,
            unique: false,
        }
    }

    /// Content-specific artwork keyed by the full path.
    pub fn unique(
        generation: u64,
        path: PathBuf,
        class: IconClass,
        colored: bool,
        priority: IconPriority,
    ) -> Self {
        Self {
            generation,
            key: path.to_string_lossy().to_string(),
            lookup_path: path,
            class,
            colored,
            priority,
            unique: true,
        }
    }
}

pub fn generic_key(class: IconClass, extension: &str, colored: bool) -> String {
    let colorspace = if colored { "color" } else { "gray" };
    match class {
        IconClass::Folder => format!("{}_folder", colorspace),
        _ => format!("{}_.{}", colorspace, extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_keys_encode_colorspace_and_extension() {
        assert_eq!(generic_key(IconClass::Image, "png", false), "gray_.png");
        assert_eq!(generic_key(IconClass::File, "txt", true), "color_.txt");
        assert_eq!(generic_key(IconClass::Folder, "", true), "color_folder");
    }

    #[test]
    fn unique_requests_are_keyed_by_full_path() {
        let req = IconRequest::unique(
            1,
            PathBuf::from("/a/photos/img1.png"),
            IconClass::Image,
            true,
            IconPriority::Low,
        );
        assert_eq!(req.key, "/a/photos/img1.png");
        assert!(req.unique);
    }
}
