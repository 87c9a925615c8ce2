// Display surface - the virtualized row list the engine binds into

use std::ops::Range;

/// Virtualized row-list abstraction. Rows are addressed by index and never
/// materialized eagerly; the engine only reports counts, dirty regions and
/// selection.
pub trait DisplaySurface {
    fn set_row_count(&mut self, rows: usize);
    fn invalidate_region(&mut self, rows: Range<usize>);
    fn select_rows(&mut self, rows: &[usize]);
    fn focus_row(&mut self, row: usize);
}

/// Surface that ignores everything; useful when no chrome is attached.
#[derive(Default)]
pub struct NullSurface;

impl DisplaySurface for NullSurface {
    fn set_row_count(&mut self, _rows: usize) {}
    fn invalidate_region(&mut self, _rows: Range<usize>) {}
    fn select_rows(&mut self, _rows: &[usize]) {}
    fn focus_row(&mut self, _row: usize) {}
}
