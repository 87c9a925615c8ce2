// Sort options and the listing comparator

use crate::entry::FileEntry;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortBy {
    Name,
    Size,
    Modified,
    Extension,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Pin state of the tags column. Unlike the plain columns, tags cycle
/// off -> ascending-pinned -> descending-pinned -> off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagPin {
    Off,
    Ascending,
    Descending,
}

/// A clickable header in the listing view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    Name,
    Size,
    Modified,
    Extension,
    Tags,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortOptions {
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub dirs_first: bool,
    pub tag_pin: TagPin,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            sort_by: SortBy::Name,
            sort_order: SortOrder::Ascending,
            dirs_first: true,
            tag_pin: TagPin::Off,
        }
    }
}

impl SortOptions {
    /// Apply a header click. Plain columns toggle between ascending and
    /// descending; the tags column cycles its pin state instead.
    pub fn click_column(&mut self, column: Column) {
        let clicked = match column {
            Column::Name => SortBy::Name,
            Column::Size => SortBy::Size,
            Column::Modified => SortBy::Modified,
            Column::Extension => SortBy::Extension,
            Column::Tags => {
                self.cycle_tag_pin();
                return;
            }
        };

        if self.sort_by == clicked {
            self.toggle_order();
        } else {
            self.sort_by = clicked;
            self.sort_order = SortOrder::Ascending;
        }
    }

    pub fn cycle_tag_pin(&mut self) {
        self.tag_pin = match self.tag_pin {
            TagPin::Off => TagPin::Ascending,
            TagPin::Ascending => TagPin::Descending,
            TagPin::Descending => TagPin::Off,
        };
    }

    pub fn toggle_order(&mut self) {
        self.sort_order = match self.sort_order {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        };
    }
}

pub fn compare_entries(a: &FileEntry, b: &FileEntry, opts: &SortOptions) -> Ordering {
    // Pinned tags come before everything else
    if opts.tag_pin != TagPin::Off {
        match (&a.tag, &b.tag) {
            (Some(ta), Some(tb)) => {
                let ord = ta.to_lowercase().cmp(&tb.to_lowercase());
                let ord = if opts.tag_pin == TagPin::Descending {
                    ord.reverse()
                } else {
                    ord
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => {}
        }
    }

    if opts.dirs_first && a.is_dir != b.is_dir {
        return b.is_dir.cmp(&a.is_dir);
    }

    let ord = match opts.sort_by {
        SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortBy::Size => a.size.cmp(&b.size),
        SortBy::Modified => a.modified.cmp(&b.modified),
        SortBy::Extension => a.extension.cmp(&b.extension),
    };
    let ord = match opts.sort_order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    };
    // Stable tie-break so equal keys keep a deterministic order
    ord.then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(name: &str, is_dir: bool, size: u64) -> FileEntry {
        let mut e = FileEntry::synthetic(name, PathBuf::from(format!("/t/{name}")), is_dir);
        e.size = size;
        e
    }

    #[test]
    fn tags_column_cycles_three_states() {
        let mut opts = SortOptions::default();
        opts.click_column(Column::Tags);
        assert_eq!(opts.tag_pin, TagPin::Ascending);
        opts.click_column(Column::Tags);
        assert_eq!(opts.tag_pin, TagPin::Descending);
        opts.click_column(Column::Tags);
        assert_eq!(opts.tag_pin, TagPin::Off);
        // Cycling tags never disturbs the active sort column
        assert_eq!(opts.sort_by, SortBy::Name);
    }

    #[test]
    fn plain_columns_toggle_direction() {
        let mut opts = SortOptions::default();
        opts.click_column(Column::Size);
        assert_eq!(opts.sort_by, SortBy::Size);
        assert_eq!(opts.sort_order, SortOrder::Ascending);
        opts.click_column(Column::Size);
        assert_eq!(opts.sort_order, SortOrder::Descending);
        opts.click_column(Column::Name);
        assert_eq!(opts.sort_by, SortBy::Name);
        assert_eq!(opts.sort_order, SortOrder::Ascending);
    }

    #[test]
    fn name_sort_is_case_insensitive_with_dirs_first() {
        let opts = SortOptions::default();
        let dir = entry("zeta", true, 0);
        let upper = entry("Alpha.txt", false, 1);
        let lower = entry("beta.txt", false, 1);
        assert_eq!(compare_entries(&dir, &upper, &opts), Ordering::Less);
        assert_eq!(compare_entries(&upper, &lower, &opts), Ordering::Less);
    }

    #[test]
    fn pinned_tags_sort_before_untagged() {
        let mut opts = SortOptions::default();
        opts.tag_pin = TagPin::Ascending;
        let mut tagged = entry("zz.txt", false, 1);
        tagged.tag = Some("work".into());
        let untagged = entry("aa.txt", false, 1);
        assert_eq!(compare_entries(&tagged, &untagged, &opts), Ordering::Less);

        opts.tag_pin = TagPin::Off;
        assert_eq!(compare_entries(&tagged, &untagged, &opts), Ordering::Greater);
    }
}
