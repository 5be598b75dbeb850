//! Offset-cursor pagination.
//!
//! Cursors are plain offsets into a deterministic ordering, recomputed on
//! every request; the server keeps no per-client paging state.

/// One page of a larger sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in `[cursor, min(cursor + limit, total))`.
    pub items: Vec<T>,
    /// Offset of the next page, or `None` when this page reaches the end.
    pub next_cursor: Option<usize>,
    /// Length of the full sequence.
    pub total: usize,
}

/// Slices `items` into the page starting at `cursor`.
///
/// A cursor past the end yields an empty page with no `next_cursor`.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], cursor: usize, limit: usize) -> Page<T> {
    let total = items.len();
    let start = cursor.min(total);
    let end = cursor.saturating_add(limit).min(total);
    Page {
        items: items[start..end].to_vec(),
        next_cursor: (end < total).then_some(end),
        total,
    }
}
