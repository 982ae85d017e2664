//! Expiring Map Store Module
//!
//! The map itself: a `HashMap` of dated values behind one exclusive lock,
//! with lazy expiry on read, oldest-first eviction on insert, and an
//! optional background sweeper.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::config::{ResolvedSettings, Settings};
use crate::error::{ExpiringMapError, Result};
use crate::map::entry::DatedValue;
use crate::map::MapStats;
use crate::tasks::{spawn_sweeper, SweeperHandle};

// == Map State ==
/// Everything guarded by the map's lock.
#[derive(Debug)]
struct MapState<T> {
    entries: HashMap<String, DatedValue<T>>,
    stats: MapStats,
}

impl<T> MapState<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            stats: MapStats::new(),
        }
    }

    // == Oldest Key ==
    /// Key with the earliest timestamp. Among equal timestamps the first
    /// one seen in iteration order wins, which is not deterministic.
    fn oldest_key(&self) -> Option<String> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.timestamp)
            .map(|(key, _)| key.clone())
    }

    // == Evict Oldest ==
    fn evict_oldest(&mut self) -> Option<String> {
        let key = self.oldest_key()?;
        self.entries.remove(&key);
        self.stats.record_eviction();
        Some(key)
    }
}

// == Expiring Map ==
/// A string-keyed map whose entries expire `age` after they were last set.
///
/// All operations take the same exclusive lock for their whole critical
/// section, since reads may delete expired entries. Share it across threads
/// with an `Arc`.
#[derive(Debug)]
pub struct ExpiringMap<T> {
    settings: ResolvedSettings,
    state: Mutex<MapState<T>>,
    sweeper: Option<SweeperHandle>,
}

impl<T> ExpiringMap<T> {
    // == Constructors ==
    /// Creates a map without a background sweeper.
    ///
    /// Expired entries are still never returned; they are reclaimed on read,
    /// on eviction, or by calling [`ExpiringMap::sweep_expired`].
    ///
    /// # Errors
    /// - `InvalidSettings` if the settings resolve to a zero age or length
    pub fn new(settings: Settings) -> Result<Self> {
        let resolved = settings.resolve()?;
        if settings.cleanup_interval.is_some_and(|interval| !interval.is_zero()) {
            warn!(
                cleanup_interval = ?settings.cleanup_interval,
                "Cleanup interval ignored, ExpiringMap::new never starts a sweeper; use with_sweeper"
            );
        }
        Ok(Self::unswept(resolved))
    }

    /// Builds a map with no sweeper, recording the sweep as disabled.
    fn unswept(mut settings: ResolvedSettings) -> Self {
        settings.cleanup_interval = None;
        Self::from_parts(settings, None)
    }

    fn from_parts(settings: ResolvedSettings, sweeper: Option<SweeperHandle>) -> Self {
        Self {
            settings,
            state: Mutex::new(MapState::new()),
            sweeper,
        }
    }

    /// Creates a shared map and, unless the cleanup interval resolves to
    /// zero, starts a background sweeper on the current tokio runtime.
    ///
    /// The sweeper only holds a weak reference; it exits once the map is
    /// dropped or [`ExpiringMap::stop_sweeper`] is called.
    ///
    /// # Errors
    /// - `InvalidSettings` if the settings resolve to a zero age or length
    /// - `NoRuntime` if a sweeper is needed but no tokio runtime is running
    pub fn with_sweeper(settings: Settings) -> Result<Arc<Self>>
    where
        T: Send + 'static,
    {
        let settings = settings.resolve()?;
        let Some(interval) = settings.cleanup_interval else {
            return Ok(Arc::new(Self::unswept(settings)));
        };

        let runtime = Handle::try_current().map_err(|_| ExpiringMapError::NoRuntime)?;
        Ok(Arc::new_cyclic(|map| {
            let sweeper = spawn_sweeper(&runtime, map.clone(), interval);
            Self::from_parts(settings, Some(sweeper))
        }))
    }

    // == Set ==
    /// Inserts or overwrites `key` with a fresh timestamp.
    ///
    /// When `key` is new and the map already holds `max_length` entries, the
    /// entry with the earliest timestamp is evicted first. Overwriting an
    /// existing key never evicts.
    ///
    /// # Panics
    /// If `panic_full` is set and a new key arrives at a full map. The lock
    /// is released first, so the map stays usable afterwards.
    pub fn set(&self, key: impl Into<String>, value: T) {
        let key = key.into();
        let mut state = self.state.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.settings.max_length {
            if self.settings.panic_full {
                drop(state);
                warn!(
                    max_length = self.settings.max_length,
                    "Expiring map is full, refusing new key"
                );
                panic!(
                    "expiring map is full (max length: {})",
                    self.settings.max_length
                );
            }

            if let Some(evicted) = state.evict_oldest() {
                debug!(key = %evicted, "Evicted oldest entry to make room");
            }
        }

        state.entries.insert(key, DatedValue::new(value));
    }

    // == Get ==
    /// Returns a clone of the value for `key` if present and not expired.
    ///
    /// An expired entry is deleted as part of the same lookup.
    pub fn get(&self, key: &str) -> Option<T>
    where
        T: Clone,
    {
        self.lookup(key, T::clone)
    }

    /// Like [`ExpiringMap::get`], but returns `(T::default(), false)` for a
    /// missing or expired key.
    pub fn get_or_default(&self, key: &str) -> (T, bool)
    where
        T: Clone + Default,
    {
        match self.get(key) {
            Some(value) => (value, true),
            None => (T::default(), false),
        }
    }

    /// Whether `key` holds a live value. Deletes the entry if it expired.
    pub fn contains_key(&self, key: &str) -> bool {
        self.lookup(key, |_| ()).is_some()
    }

    fn lookup<R>(&self, key: &str, read: impl FnOnce(&T) -> R) -> Option<R> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(entry) = state.entries.get(key) else {
            state.stats.record_miss();
            return None;
        };

        if entry.is_expired(self.settings.age) {
            state.entries.remove(key);
            state.stats.record_expiration();
            state.stats.record_miss();
            debug!(key, "Removed expired entry on read");
            return None;
        }

        let result = read(&entry.value);
        state.stats.record_hit();
        Some(result)
    }

    // == Remove ==
    /// Deletes `key` if present. Missing keys are ignored.
    pub fn remove(&self, key: &str) {
        self.state.lock().entries.remove(key);
    }

    /// Deletes `key` and returns its value if it had not expired yet.
    pub fn take(&self, key: &str) -> Option<T> {
        let entry = self.state.lock().entries.remove(key)?;
        if entry.is_expired(self.settings.age) {
            None
        } else {
            Some(entry.value)
        }
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }

    // == Sweep Expired ==
    /// Removes all expired entries and returns how many were removed.
    ///
    /// This is what the background sweeper runs on every tick.
    pub fn sweep_expired(&self) -> usize {
        let age = self.settings.age;
        let mut state = self.state.lock();

        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired(age));
        let removed = before - state.entries.len();

        state.stats.record_swept(removed);
        removed
    }

    // == Length ==
    /// Number of stored entries, including expired ones not yet reclaimed.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether no entries are stored, expired or not.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the map's counters.
    pub fn stats(&self) -> MapStats {
        let state = self.state.lock();
        let mut stats = state.stats.clone();
        stats.total_entries = state.entries.len();
        stats
    }

    /// Settings in effect. `cleanup_interval` is `None` unless a sweeper
    /// was started.
    pub fn settings(&self) -> &ResolvedSettings {
        &self.settings
    }

    // == Sweeper Control ==
    /// Stops the background sweeper. Safe to call repeatedly, or on a map
    /// that never had one.
    pub fn stop_sweeper(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.stop();
        }
    }

    /// Whether a sweeper was started and has not been stopped.
    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper
            .as_ref()
            .is_some_and(|sweeper| !sweeper.is_stopped())
    }

    /// Handle to the background sweeper, if one was started.
    pub fn sweeper(&self) -> Option<&SweeperHandle> {
        self.sweeper.as_ref()
    }
}

impl<T> Default for ExpiringMap<T> {
    fn default() -> Self {
        Self::unswept(ResolvedSettings::default())
    }
}

impl<T> Drop for ExpiringMap<T> {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}
