pub mod folder_view;
pub mod sort;
pub mod tabs;

pub use folder_view::FolderViewState;
pub use sort::{Column, SortBy, SortOptions, SortOrder, TagPin};
pub use tabs::{TabState, TabsManager};
