use crate::state::sort::{SortBy, SortOptions, SortOrder, TagPin};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Config {
    pub ui: UiConfig,
    pub icons: IconConfig,
}

/// UI behavior configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UiConfig {
    /// Show hidden files by default
    pub show_hidden: bool,
    /// Default sort field: "name", "size", "modified", "extension"
    pub sort_by: String,
    /// Sort order: "asc" or "desc"
    pub sort_order: String,
    /// Show directories first in sorting
    pub dirs_first: bool,
}

/// Icon and thumbnail configuration
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IconConfig {
    /// Generate real content thumbnails for image files
    pub show_thumbnails: bool,
    /// Resolve generic artwork from the system icon tier
    pub use_system_icons: bool,
    /// Render icon artwork in grayscale
    pub grayscale: bool,
    /// Edge length of small icons (in pixels)
    pub icon_size: u32,
    /// Edge length of large icons and thumbnails (in pixels)
    pub thumbnail_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ui: UiConfig {
                show_hidden: false,
                sort_by: "name".to_string(),
                sort_order: "asc".to_string(),
                dirs_first: true,
            },
            icons: IconConfig {
                show_thumbnails: true,
                use_system_icons: true,
                grayscale: false,
                icon_size: 16,
                thumbnail_size: 96,
            },
        }
    }
}

impl UiConfig {
    pub fn sort_options(&self) -> SortOptions {
        let sort_by = match self.sort_by.as_str() {
            "size" => SortBy::Size,
            "modified" => SortBy::Modified,
            "extension" => SortBy::Extension,
            _ => SortBy::Name,
        };
        let sort_order = match self.sort_order.as_str() {
            "desc" => SortOrder::Descending,
            _ => SortOrder::Ascending,
        };
        SortOptions {
            sort_by,
            sort_order,
            dirs_first: self.dirs_first,
            tag_pin: TagPin::Off,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Option<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "plover") {
            let config_dir = proj_dirs.config_dir();
            return Some(config_dir.join("config.toml"));
        }
        None
    }

    /// Load configuration from file, or return defaults if file doesn't exist
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if path.exists() {
                match fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<Config>(&contents) {
                        Ok(config) => return config,
                        Err(e) => {
                            log::warn!("Failed to parse config file: {}", e);
                        }
                    },
                    Err(e) => {
                        log::warn!("Failed to read config file: {}", e);
                    }
                }
            }
        }
        Config::default()
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }

            let contents = toml::to_string_pretty(self)?;
            fs::write(&path, contents)?;
            return Ok(());
        }

        Err("Could not determine config directory".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.ui.show_hidden);
        assert!(config.icons.show_thumbnails);
        assert_eq!(config.icons.icon_size, 16);
        assert_eq!(config.icons.thumbnail_size, 96);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let deserialized: Config = toml::from_str(&toml_str).expect("Failed to deserialize");
        assert_eq!(config.ui.sort_by, deserialized.ui.sort_by);
        assert_eq!(config.icons.grayscale, deserialized.icons.grayscale);
    }

    #[test]
    fn test_sort_options_parsing() {
        let mut config = Config::default();
        config.ui.sort_by = "modified".to_string();
        config.ui.sort_order = "desc".to_string();
        let opts = config.ui.sort_options();
        assert_eq!(opts.sort_by, SortBy::Modified);
        assert_eq!(opts.sort_order, SortOrder::Descending);
        assert_eq!(opts.tag_pin, TagPin::Off);
    }
}
