//! Process-wide keyed store of server state.
//!
//! Every operation except [`EntityCache::read`] is synchronous and runs
//! under one short lock, so cache transitions are atomic with respect to
//! each other. The lock is never held across an `.await`: loads run as
//! spawned tasks and report back through [`EntityCache::settle`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::CacheConfig;
use crate::gateway::{ErrorKind, GatewayError};

use super::entry::{CacheData, CacheEntry, FetchStatus};
use super::key::{QueryFilter, QueryKey, QueryKind};

/// Result a loader resolves to.
pub type LoadOutcome = Result<CacheData, GatewayError>;

/// Freshness and retention windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub collection_stale_time: Duration,
    pub item_stale_time: Duration,
    /// Idle time after which an unobserved entry may be dropped.
    pub gc_time: Duration,
}

impl CachePolicy {
    pub fn stale_time(&self, kind: QueryKind) -> Duration {
        match kind {
            QueryKind::Collection => self.collection_stale_time,
            QueryKind::Item => self.item_stale_time,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            collection_stale_time: Duration::from_secs(config.collection_stale_seconds),
            item_stale_time: Duration::from_secs(config.item_stale_seconds),
            gc_time: Duration::from_secs(config.gc_seconds),
        }
    }
}

/// The data of every matched slot at one instant.
pub type SnapshotEntries = Vec<(QueryKey, Option<CacheData>)>;

/// Shared cache handle. Cloning shares the same store.
#[derive(Clone)]
pub struct EntityCache {
    inner: Arc<Mutex<CacheInner>>,
    policy: CachePolicy,
}

#[derive(Default)]
struct CacheInner {
    slots: HashMap<QueryKey, Slot>,
}

impl CacheInner {
    fn slot_mut(&mut self, key: &QueryKey, now: Instant) -> &mut Slot {
        self.slots
            .entry(key.clone())
            .or_insert_with(|| Slot::new(now))
    }
}

struct Slot {
    entry: CacheEntry,
    /// Bumped whenever a load starts or is detached; a load may only
    /// settle into the slot while its generation is still current.
    generation: u64,
    in_flight: Option<InFlight>,
    /// A detached load whose request is still running. No new load starts
    /// for the key until it settles.
    superseded: Option<InFlight>,
    publisher: watch::Sender<CacheEntry>,
    last_accessed: Instant,
}

struct InFlight {
    generation: u64,
    status_before: FetchStatus,
    done: watch::Receiver<bool>,
}

impl Slot {
    fn new(now: Instant) -> Self {
        let (publisher, _) = watch::channel(CacheEntry::default());
        Self {
            entry: CacheEntry::default(),
            generation: 0,
            in_flight: None,
            superseded: None,
            publisher,
            last_accessed: now,
        }
    }

    fn publish(&self) {
        self.publisher.send_replace(self.entry.clone());
    }

    /// Stops waiting on the current load; its result will be discarded.
    fn detach_load(&mut self) -> bool {
        let Some(flight) = self.in_flight.take() else {
            return false;
        };
        self.generation += 1;
        if self.entry.status == FetchStatus::Loading {
            self.entry.status = flight.status_before;
        }
        self.superseded = Some(flight);
        true
    }
}

enum ReadStep {
    Ready(CacheEntry),
    Wait {
        generation: u64,
        done: watch::Receiver<bool>,
    },
    /// A detached load still holds the key; start over once it settles.
    Drain {
        generation: u64,
        done: watch::Receiver<bool>,
    },
}

impl EntityCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            policy,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Returns the entry for `key`, loading it first when stale.
    ///
    /// A fresh entry is returned without calling `loader`. A stale one is
    /// marked `Loading` and `loader` runs as a spawned task; concurrent
    /// reads of the same key join that task instead of starting another.
    /// On failure the previous data stays in place next to the error.
    ///
    /// While a detached load for `key` is still running, the read waits for
    /// it before deciding whether to load, so one key never has two
    /// requests out at once.
    pub async fn read<F, Fut>(&self, key: &QueryKey, loader: F) -> CacheEntry
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoadOutcome> + Send + 'static,
    {
        let mut loader = Some(loader);
        let mut step = self.begin_read(key, &mut loader);
        loop {
            match step {
                ReadStep::Ready(entry) => return entry,
                ReadStep::Wait {
                    generation,
                    mut done,
                } => {
                    if done.wait_for(|settled| *settled).await.is_err() {
                        self.abandon(key, generation);
                    }
                    step = self.resume(key, generation);
                }
                ReadStep::Drain {
                    generation,
                    mut done,
                } => {
                    if done.wait_for(|settled| *settled).await.is_err() {
                        self.abandon(key, generation);
                    }
                    step = self.begin_read(key, &mut loader);
                }
            }
        }
    }

    fn begin_read<F, Fut>(&self, key: &QueryKey, loader: &mut Option<F>) -> ReadStep
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = LoadOutcome> + Send + 'static,
    {
        let now = Instant::now();
        let (generation, settled_tx, settled_rx, loader) = {
            let mut inner = self.inner.lock();
            let slot = inner.slot_mut(key, now);
            slot.last_accessed = now;

            if let Some(flight) = &slot.in_flight {
                tracing::trace!(key = %key, generation = flight.generation, "Joining in-flight load");
                return ReadStep::Wait {
                    generation: flight.generation,
                    done: flight.done.clone(),
                };
            }
            if let Some(flight) = &slot.superseded {
                tracing::trace!(key = %key, generation = flight.generation, "Waiting for detached load");
                return ReadStep::Drain {
                    generation: flight.generation,
                    done: flight.done.clone(),
                };
            }
            if !slot.entry.is_stale(now) {
                return ReadStep::Ready(slot.entry.clone());
            }
            let Some(loader) = loader.take() else {
                return ReadStep::Ready(slot.entry.clone());
            };

            slot.generation += 1;
            let generation = slot.generation;
            let (settled_tx, settled_rx) = watch::channel(false);
            slot.in_flight = Some(InFlight {
                generation,
                status_before: slot.entry.status,
                done: settled_rx.clone(),
            });
            slot.entry.status = FetchStatus::Loading;
            slot.publish();
            (generation, settled_tx, settled_rx, loader)
        };

        tracing::debug!(key = %key, generation, "Loading");
        let load = loader();
        let cache = self.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let outcome = load.await;
            cache.settle(&key, generation, outcome);
            let _ = settled_tx.send(true);
        });

        ReadStep::Wait {
            generation,
            done: settled_rx,
        }
    }

    /// After a load settled: follow a newer load if one replaced it.
    fn resume(&self, key: &QueryKey, generation: u64) -> ReadStep {
        let mut inner = self.inner.lock();
        let Some(slot) = inner.slots.get_mut(key) else {
            return ReadStep::Ready(CacheEntry::default());
        };
        slot.last_accessed = Instant::now();
        match &slot.in_flight {
            Some(flight) if flight.generation > generation => ReadStep::Wait {
                generation: flight.generation,
                done: flight.done.clone(),
            },
            _ => ReadStep::Ready(slot.entry.clone()),
        }
    }

    fn settle(&self, key: &QueryKey, generation: u64, outcome: LoadOutcome) {
        let now = Instant::now();
        let stale_time = self.policy.stale_time(key.kind());
        let mut inner = self.inner.lock();
        let Some(slot) = inner.slots.get_mut(key) else {
            return;
        };
        if slot.in_flight.as_ref().map(|f| f.generation) != Some(generation) {
            if slot.superseded.as_ref().map(|f| f.generation) == Some(generation) {
                slot.superseded = None;
            }
            tracing::debug!(key = %key, generation, "Discarding superseded load");
            return;
        }

        slot.in_flight = None;
        match outcome {
            Ok(data) => {
                slot.entry.data = Some(data);
                slot.entry.status = FetchStatus::Success;
                slot.entry.error = None;
                slot.entry.fetched_at = Some(now);
                slot.entry.stale_after = Some(now + stale_time);
                slot.entry.invalidated = false;
                tracing::debug!(key = %key, generation, "Load succeeded");
            }
            Err(err) => {
                tracing::warn!(
                    key = %key,
                    generation,
                    error_type = err.error_type(),
                    error = %err,
                    "Load failed, keeping last data"
                );
                slot.entry.status = FetchStatus::Error;
                slot.entry.error = Some(err);
            }
        }
        slot.last_accessed = now;
        slot.publish();
    }

    /// The load task ended without reporting (panicked or was aborted).
    fn abandon(&self, key: &QueryKey, generation: u64) {
        let mut inner = self.inner.lock();
        let Some(slot) = inner.slots.get_mut(key) else {
            return;
        };
        if slot.superseded.as_ref().map(|f| f.generation) == Some(generation) {
            slot.superseded = None;
            tracing::error!(key = %key, generation, "Detached load ended without a result");
            return;
        }
        if slot.in_flight.as_ref().map(|f| f.generation) != Some(generation) {
            return;
        }
        slot.in_flight = None;
        slot.entry.status = FetchStatus::Error;
        slot.entry.error = Some(GatewayError::new(ErrorKind::Unknown, "Load was aborted"));
        tracing::error!(key = %key, generation, "Load task ended without a result");
        slot.publish();
    }

    /// Replaces the data of `key` with `updater(current)`, no network.
    ///
    /// `status` is left as is. Writing `None` to a missing key is a no-op;
    /// writing data to a missing key creates an idle, stale entry.
    pub fn write<F>(&self, key: &QueryKey, updater: F)
    where
        F: FnOnce(Option<&CacheData>) -> Option<CacheData>,
    {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let next = updater(inner.slots.get(key).and_then(|s| s.entry.data.as_ref()));
        if next.is_none() && !inner.slots.contains_key(key) {
            return;
        }
        let slot = inner.slot_mut(key, now);
        slot.entry.data = next;
        slot.last_accessed = now;
        slot.publish();
    }

    /// Applies `updater` to the data of every slot matching `filter`.
    pub fn write_matching<F>(&self, filter: &QueryFilter, mut updater: F) -> usize
    where
        F: FnMut(&QueryKey, Option<&CacheData>) -> Option<CacheData>,
    {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let mut touched = 0;
        for (key, slot) in inner.slots.iter_mut().filter(|(k, _)| filter.matches(k)) {
            slot.entry.data = updater(key, slot.entry.data.as_ref());
            slot.last_accessed = now;
            slot.publish();
            touched += 1;
        }
        touched
    }

    /// Marks matching entries stale so the next read refetches.
    ///
    /// Data is untouched. Loads in flight for these keys are detached:
    /// they started before whatever made the data outdated. The refetch
    /// waits for a detached request to finish before going out.
    pub fn invalidate(&self, filter: &QueryFilter) -> usize {
        let mut inner = self.inner.lock();
        let mut matched = 0;
        for (key, slot) in inner.slots.iter_mut().filter(|(k, _)| filter.matches(k)) {
            if slot.detach_load() {
                tracing::debug!(key = %key, "Detached in-flight load on invalidate");
            }
            slot.entry.invalidated = true;
            slot.publish();
            matched += 1;
        }
        tracing::debug!(?filter, matched, "Invalidated");
        matched
    }

    /// Detaches loads in flight for matching keys without marking them stale.
    pub fn cancel(&self, filter: &QueryFilter) -> usize {
        let mut inner = self.inner.lock();
        let mut cancelled = 0;
        for (key, slot) in inner.slots.iter_mut().filter(|(k, _)| filter.matches(k)) {
            if slot.detach_load() {
                tracing::debug!(key = %key, "Cancelled in-flight load");
                slot.publish();
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Current data of `key`, without side effects.
    pub fn snapshot(&self, key: &QueryKey) -> Option<CacheData> {
        self.inner
            .lock()
            .slots
            .get(key)
            .and_then(|slot| slot.entry.data.clone())
    }

    /// Data of every existing slot matching any filter, taken atomically.
    pub fn snapshot_matching(&self, filters: &[QueryFilter]) -> SnapshotEntries {
        let inner = self.inner.lock();
        inner
            .slots
            .iter()
            .filter(|(key, _)| filters.iter().any(|f| f.matches(key)))
            .map(|(key, slot)| (key.clone(), slot.entry.data.clone()))
            .collect()
    }

    /// Writes snapshotted data back verbatim, atomically.
    pub fn restore(&self, entries: &[(QueryKey, Option<CacheData>)]) {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        for (key, data) in entries {
            if data.is_none() && !inner.slots.contains_key(key) {
                continue;
            }
            let slot = inner.slot_mut(key, now);
            slot.entry.data = data.clone();
            slot.last_accessed = now;
            slot.publish();
        }
    }

    /// Current entry for `key`, without side effects.
    pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.inner
            .lock()
            .slots
            .get(key)
            .map(|slot| slot.entry.clone())
    }

    pub fn keys(&self, filter: &QueryFilter) -> Vec<QueryKey> {
        self.inner
            .lock()
            .slots
            .keys()
            .filter(|key| filter.matches(key))
            .cloned()
            .collect()
    }

    /// Observes every change to `key`'s entry, creating it if needed.
    pub fn subscribe(&self, key: &QueryKey) -> CacheSubscription {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let slot = inner.slot_mut(key, now);
        slot.last_accessed = now;
        CacheSubscription {
            key: key.clone(),
            receiver: slot.publisher.subscribe(),
        }
    }

    /// Drops entries nobody observes, with no load running, idle for
    /// at least the policy's `gc_time`.
    pub fn collect_garbage(&self) -> usize {
        let now = Instant::now();
        let gc_time = self.policy.gc_time;
        let mut inner = self.inner.lock();
        let before = inner.slots.len();
        inner.slots.retain(|_, slot| {
            slot.publisher.receiver_count() > 0
                || slot.in_flight.is_some()
                || slot.superseded.is_some()
                || now.duration_since(slot.last_accessed) < gc_time
        });
        let removed = before - inner.slots.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = inner.slots.len(), "Collected idle cache entries");
        }
        removed
    }

    /// Runs [`collect_garbage`](Self::collect_garbage) every `interval`.
    pub fn spawn_gc(&self, interval: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.collect_garbage();
            }
        })
    }

    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

/// Read-only view of one key's entry as it changes.
pub struct CacheSubscription {
    key: QueryKey,
    receiver: watch::Receiver<CacheEntry>,
}

impl CacheSubscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Latest published entry.
    pub fn current(&self) -> CacheEntry {
        self.receiver.borrow().clone()
    }

    /// The latest entry if it changed since last seen.
    pub fn take_change(&mut self) -> Option<CacheEntry> {
        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    /// Waits for the next change. `None` once the cache is gone.
    pub async fn changed(&mut self) -> Option<CacheEntry> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}
