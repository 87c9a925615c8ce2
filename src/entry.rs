use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

/// Broad artwork class used when no content-specific icon is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconClass {
    Folder,
    File,
    Image,
}

#[derive(Clone, Debug)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub size: u64,
    pub modified: SystemTime,
    pub extension: String,
    pub tag: Option<String>,
}

impl FileEntry {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let symlink_meta = fs::symlink_metadata(&path).ok()?;
        let is_symlink = symlink_meta.is_symlink();

        let name = path.file_name()?.to_string_lossy().to_string();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let metadata = fs::metadata(&path).ok();
        let is_dir = metadata.as_ref().map(|m| m.is_dir()).unwrap_or(false);
        let size = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
        let modified = metadata
            .as_ref()
            .and_then(|m| m.modified().ok())
            .or_else(|| symlink_meta.modified().ok())
            .unwrap_or(SystemTime::now());

        Some(Self {
            path,
            name,
            is_dir,
            is_symlink,
            size,
            modified,
            extension,
            tag: None,
        })
    }

    /// Entry for a namespace member that has no backing metadata, such as
    /// the filesystem root or a virtual device container.
    pub fn synthetic(name: impl Into<String>, path: PathBuf, is_dir: bool) -> Self {
        let name = name.into();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            path,
            name,
            is_dir,
            is_symlink: false,
            size: 0,
            modified: SystemTime::now(),
            extension,
            tag: None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(
            self.extension.as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "ico" | "tiff"
        )
    }

    pub fn icon_class(&self) -> IconClass {
        if self.is_dir {
            IconClass::Folder
        } else if self.is_image() {
            IconClass::Image
        } else {
            IconClass::File
        }
    }

    pub fn glyph(&self) -> &str {
        if self.is_dir {
            return "\u{f07b}";
        }
        match self.extension.as_str() {
            "rs" => "\u{e7a8}",
            "toml" | "yaml" | "yml" => "\u{e615}",
            "md" => "\u{e73e}",
            "txt" => "\u{f15c}",
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "ico" | "tiff" => "\u{f1c5}",
            "mp4" | "mkv" | "mov" | "avi" | "webm" => "\u{f03d}",
            "mp3" | "wav" | "flac" | "ogg" | "m4a" => "\u{f001}",
            "zip" | "tar" | "gz" | "7z" | "rar" | "xz" | "bz2" => "\u{f410}",
            "pdf" => "\u{f1c1}",
            "sh" | "bash" | "zsh" => "\u{f489}",
            "json" => "\u{e60b}",
            "log" => "\u{f18d}",
            _ => "\u{f15b}",
        }
    }

    pub fn display_name(&self) -> String {
        if self.is_symlink {
            format!("{} \u{2192}", self.name)
        } else {
            self.name.clone()
        }
    }
}
