use crate::cache::{CacheEntry, QueryKey};
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum ListIntent {
    /// A new search term; `None` or empty lists everyone.
    SearchChanged { search: Option<String> },
    /// The cache entry for `key` changed.
    ///
    /// Ignored unless `key` is the current search's key.
    EntryChanged { key: QueryKey, entry: CacheEntry },
}

impl Intent for ListIntent {}
