//! Keyed client-side store of server state.
//!
//! Entries are addressed by [`QueryKey`], read through
//! [`EntityCache::read`] with a loader that fetches from the gateway,
//! and edited in place by the mutation coordinator. Every change is
//! published to subscribers.

mod entry;
mod key;
mod store;

pub use entry::{CacheData, CacheEntry, FetchStatus};
pub use key::{QueryFilter, QueryKey, QueryKind};
pub use store::{CachePolicy, CacheSubscription, EntityCache, LoadOutcome, SnapshotEntries};
