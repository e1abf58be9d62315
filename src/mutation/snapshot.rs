use crate::cache::{EntityCache, QueryFilter, QueryKey, SnapshotEntries};

/// Data of the entries a mutation touches, captured before its
/// optimistic edit and written back verbatim on rollback.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationSnapshot {
    entries: SnapshotEntries,
}

impl MutationSnapshot {
    pub fn capture(cache: &EntityCache, filters: &[QueryFilter]) -> Self {
        Self {
            entries: cache.snapshot_matching(filters),
        }
    }

    pub fn restore(&self, cache: &EntityCache) {
        cache.restore(&self.entries);
    }

    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
