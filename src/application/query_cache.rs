//! Query cache: keyed results, background refresh and request de-duplication.
//!
//! Consumers subscribe with a [`RequestDescriptor`] and get the latest known
//! [`CacheEntry`] immediately; fetching happens on spawned tasks. Per key:
//!
//! - concurrent subscribers share one in-flight fetch;
//! - responses are applied in issue order, so a slow older response never
//!   overwrites one from a newer request;
//! - a failed fetch keeps the last good value next to the error;
//! - a result arriving after the last subscriber left is dropped;
//! - an optional refresh interval re-fetches while anyone is subscribed;
//! - entries are evicted once unreferenced for the retention window.
//!
//! The slot map is the only shared state. It sits behind one mutex that is
//! never held across an await.

use crate::application::payload::{fetch_payload, Payload};
use crate::config::CacheConfig;
use crate::domain::error::ClientError;
use crate::domain::ports::market_api::MarketApi;
use crate::domain::values::cache_status::CacheStatus;
use crate::domain::values::request_descriptor::RequestDescriptor;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Snapshot of one cached result.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub key: String,
    /// Last good value. Survives failed refreshes.
    pub value: Option<T>,
    /// Error of the latest fetch, when it failed.
    pub error: Option<ClientError>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub status: CacheStatus,
    /// Sequence number of the fetch that produced this state (0 before any).
    pub generation: u64,
}

impl<T> CacheEntry<T> {
    fn pending(key: String) -> Self {
        Self {
            key,
            value: None,
            error: None,
            fetched_at: None,
            status: CacheStatus::Pending,
            generation: 0,
        }
    }

    /// A value is available but may no longer reflect the backend.
    pub fn is_outdated(&self) -> bool {
        self.value.is_some() && matches!(self.status, CacheStatus::Stale | CacheStatus::Error)
    }
}

struct RefreshTimer {
    interval: Duration,
    handle: JoinHandle<()>,
}

struct Slot {
    descriptor: RequestDescriptor,
    entry: CacheEntry<Payload>,
    fetched: Option<Instant>,
    tx: watch::Sender<CacheEntry<Payload>>,
    subscribers: usize,
    /// Requested refresh intervals with their subscriber counts.
    intervals: BTreeMap<Duration, usize>,
    timer: Option<RefreshTimer>,
    issued_seq: u64,
    in_flight: bool,
    /// Bumped on every attach and on the final detach; a pending eviction only
    /// fires if it still matches.
    release_epoch: u64,
}

impl Slot {
    fn new(descriptor: RequestDescriptor) -> Self {
        let entry = CacheEntry::pending(descriptor.cache_key());
        let (tx, _) = watch::channel(entry.clone());
        Self {
            descriptor,
            entry,
            fetched: None,
            tx,
            subscribers: 0,
            intervals: BTreeMap::new(),
            timer: None,
            issued_seq: 0,
            in_flight: false,
            release_epoch: 0,
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.entry.clone());
    }

    fn issue(&mut self) -> u64 {
        self.issued_seq += 1;
        self.in_flight = true;
        self.issued_seq
    }

    /// Fresh → stale once the freshness window has passed.
    fn expire(&mut self, freshness: Duration) {
        if self.entry.status == CacheStatus::Fresh && self.fetched.is_some_and(|t| t.elapsed() >= freshness) {
            self.entry.status = CacheStatus::Stale;
        }
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}

struct Inner {
    api: Arc<dyn MarketApi>,
    config: CacheConfig,
    runtime: Handle,
    slots: Mutex<HashMap<String, Slot>>,
}

/// Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .field("retention", &self.inner.config.retention)
            .finish()
    }
}

impl QueryCache {
    /// Must be called from within a Tokio runtime; fetches and timers are
    /// spawned onto it.
    pub fn new(api: Arc<dyn MarketApi>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                config,
                runtime: Handle::current(),
                slots: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Attach to `descriptor`'s entry, fetching if nothing usable is cached.
    /// With `refresh_interval`, the entry is re-fetched on that cadence while
    /// at least one subscriber remains; the shortest requested interval wins.
    pub fn subscribe(&self, descriptor: &RequestDescriptor, refresh_interval: Option<Duration>) -> Subscription {
        self.inner.subscribe(descriptor, refresh_interval)
    }

    /// Mark the entry stale and re-fetch right away if anyone is subscribed.
    pub fn invalidate(&self, descriptor: &RequestDescriptor) {
        self.inner.invalidate(&descriptor.cache_key());
    }

    /// Current snapshot without subscribing or fetching.
    pub fn peek(&self, descriptor: &RequestDescriptor) -> Option<CacheEntry<Payload>> {
        self.inner.snapshot(&descriptor.cache_key())
    }

    /// One-shot: subscribe, wait for the outcome, detach.
    /// A cached fresh value is returned without a network call.
    pub async fn fetch(&self, descriptor: &RequestDescriptor) -> Result<Payload, ClientError> {
        let mut subscription = self.subscribe(descriptor, None);
        let entry = subscription.settled().await;
        if let (CacheStatus::Error, Some(err)) = (entry.status, entry.error) {
            return Err(err);
        }
        entry
            .value
            .ok_or_else(|| ClientError::MalformedResponse(format!("{}: settled without a value", entry.key)))
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(self: &Arc<Self>, descriptor: &RequestDescriptor, refresh: Option<Duration>) -> Subscription {
        let key = descriptor.cache_key();
        let refresh = refresh.filter(|interval| !interval.is_zero());
        let freshness = self.config.freshness(descriptor.resource());

        let mut slots = self.lock();
        let slot = slots
            .entry(key.clone())
            .or_insert_with(|| Slot::new(descriptor.clone()));
        slot.subscribers += 1;
        slot.release_epoch += 1;
        if let Some(interval) = refresh {
            *slot.intervals.entry(interval).or_insert(0) += 1;
        }

        slot.expire(freshness);
        let fetch = if !slot.in_flight && slot.entry.status != CacheStatus::Fresh {
            Some((slot.issue(), slot.descriptor.clone()))
        } else {
            None
        };
        let target = if slot.in_flight {
            slot.issued_seq
        } else {
            slot.entry.generation
        };
        let rx = slot.tx.subscribe();
        self.ensure_timer(slot, &key);
        drop(slots);

        match fetch {
            Some((seq, descriptor)) => {
                tracing::debug!(key = %key, seq, "fetching");
                self.spawn_fetch(key.clone(), descriptor, seq);
            }
            None => tracing::debug!(key = %key, "joined cached or in-flight entry"),
        }

        Subscription {
            key,
            refresh,
            target,
            rx,
            cache: Arc::clone(self),
        }
    }

    fn invalidate(self: &Arc<Self>, key: &str) {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };
        if slot.entry.value.is_some() {
            slot.entry.status = CacheStatus::Stale;
            slot.publish();
        }
        if slot.subscribers == 0 {
            return;
        }
        let seq = slot.issue();
        let descriptor = slot.descriptor.clone();
        drop(slots);

        tracing::debug!(key, seq, "invalidated, refetching");
        self.spawn_fetch(key.to_string(), descriptor, seq);
    }

    fn snapshot(&self, key: &str) -> Option<CacheEntry<Payload>> {
        let mut slots = self.lock();
        let slot = slots.get_mut(key)?;
        slot.expire(self.config.freshness(slot.descriptor.resource()));
        Some(slot.entry.clone())
    }

    fn spawn_fetch(self: &Arc<Self>, key: String, descriptor: RequestDescriptor, seq: u64) {
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            let result = fetch_payload(inner.api.as_ref(), &descriptor).await;
            inner.complete(&key, seq, result);
        });
    }

    fn complete(&self, key: &str, seq: u64, result: Result<Payload, ClientError>) {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(key) else {
            tracing::debug!(key, seq, "entry evicted before response arrived");
            return;
        };
        if seq == slot.issued_seq {
            slot.in_flight = false;
        }
        // Older than what is already applied: a newer request won the race.
        if seq <= slot.entry.generation {
            tracing::debug!(key, seq, applied = slot.entry.generation, "discarding superseded response");
            return;
        }
        if slot.subscribers == 0 {
            tracing::debug!(key, seq, "no subscribers left, dropping response");
            return;
        }

        slot.entry.generation = seq;
        match result {
            Ok(value) => {
                slot.entry.value = Some(value);
                slot.entry.error = None;
                slot.entry.status = CacheStatus::Fresh;
                slot.entry.fetched_at = Some(Utc::now());
                slot.fetched = Some(Instant::now());
            }
            Err(err) => {
                tracing::warn!(key, seq, error = %err, retained = slot.entry.value.is_some(), "fetch failed");
                slot.entry.error = Some(err);
                slot.entry.status = CacheStatus::Error;
            }
        }
        slot.publish();
    }

    /// Start, restart or stop the refresh timer to match the shortest
    /// interval any current subscriber asked for.
    fn ensure_timer(self: &Arc<Self>, slot: &mut Slot, key: &str) {
        let wanted = slot.intervals.keys().next().copied();
        if wanted == slot.timer.as_ref().map(|t| t.interval) {
            return;
        }
        slot.stop_timer();
        let Some(interval) = wanted else {
            return;
        };

        let weak = Arc::downgrade(self);
        let key = key.to_string();
        let handle = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if !inner.refresh_tick(&key) {
                    break;
                }
            }
        });
        slot.timer = Some(RefreshTimer { interval, handle });
    }

    /// Re-issue the fetch for `key`, regardless of how the previous one ended.
    /// A tick that finds a fetch still running is skipped.
    /// Returns false once the key has nobody left to refresh for.
    fn refresh_tick(self: &Arc<Self>, key: &str) -> bool {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(key) else {
            return false;
        };
        if slot.subscribers == 0 {
            return false;
        }
        if slot.in_flight {
            tracing::debug!(key, seq = slot.issued_seq, "previous fetch still running, skipping tick");
            return true;
        }
        if slot.entry.status == CacheStatus::Fresh {
            slot.entry.status = CacheStatus::Stale;
        }
        let seq = slot.issue();
        let descriptor = slot.descriptor.clone();
        drop(slots);

        tracing::debug!(key, seq, "interval refresh");
        self.spawn_fetch(key.to_string(), descriptor, seq);
        true
    }

    fn release(self: &Arc<Self>, key: &str, refresh: Option<Duration>) {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };
        slot.subscribers = slot.subscribers.saturating_sub(1);
        if let Some(interval) = refresh {
            if let Some(count) = slot.intervals.get_mut(&interval) {
                *count -= 1;
                if *count == 0 {
                    slot.intervals.remove(&interval);
                }
            }
        }
        if slot.subscribers > 0 {
            self.ensure_timer(slot, key);
            return;
        }

        slot.stop_timer();
        slot.intervals.clear();
        slot.release_epoch += 1;
        let epoch = slot.release_epoch;
        let retention = self.config.retention;
        if retention.is_zero() {
            slots.remove(key);
            tracing::debug!(key, "evicted");
            return;
        }
        drop(slots);

        let weak = Arc::downgrade(self);
        let key = key.to_string();
        self.runtime.spawn(async move {
            tokio::time::sleep(retention).await;
            if let Some(inner) = weak.upgrade() {
                inner.evict(&key, epoch);
            }
        });
    }

    fn evict(&self, key: &str, epoch: u64) {
        let mut slots = self.lock();
        if slots
            .get(key)
            .is_some_and(|s| s.subscribers == 0 && s.release_epoch == epoch)
        {
            slots.remove(key);
            tracing::debug!(key, "evicted");
        }
    }
}

/// A live reference to one cache entry. Dropping it detaches.
pub struct Subscription {
    key: String,
    refresh: Option<Duration>,
    /// Generation whose outcome this subscriber is waiting on.
    target: u64,
    rx: watch::Receiver<CacheEntry<Payload>>,
    cache: Arc<Inner>,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Latest snapshot, with freshness re-evaluated.
    pub fn current(&self) -> CacheEntry<Payload> {
        self.cache
            .snapshot(&self.key)
            .unwrap_or_else(|| self.rx.borrow().clone())
    }

    /// Wait until the fetch that was outstanding when this subscription was
    /// created (or a later one) has produced data or an error.
    pub async fn settled(&mut self) -> CacheEntry<Payload> {
        let target = self.target;
        let result = self
            .rx
            .wait_for(|e| e.generation >= target && e.status.is_settled())
            .await
            .map(|e| CacheEntry::clone(&e));
        match result {
            Ok(entry) => entry,
            Err(_) => self.current(),
        }
    }

    /// Wait for the next published update. `None` once the entry is gone.
    pub async fn changed(&mut self) -> Option<CacheEntry<Payload>> {
        self.rx.changed().await.ok()?;
        let entry = self.rx.borrow_and_update().clone();
        Some(entry)
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("refresh", &self.refresh)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cache.release(&self.key, self.refresh);
    }
}
