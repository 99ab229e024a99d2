//! Cache counters with snapshot and diff.
//!
//! Four monotonically increasing counters observe every definition cache
//! operation:
//!
//! | Counter | Incremented when |
//! |---------|------------------|
//! | `cacheHit` | a lookup finds a stored definition |
//! | `cacheMiss` | a lookup has to compile |
//! | `componentDefinitionCount` | a component definition is stored |
//! | `helperDefinitionCount` | a helper definition is stored |
//!
//! The process-wide set returned by [`global_counters`] is what caches report to
//! by default. Production code never resets it; tests take a [`CounterSnapshot`]
//! before and after an operation and compare them with [`CounterSnapshot::diff`],
//! which keeps only the counters that moved.
//!
//! # Examples
//!
//! ```rust
//! use defcache::telemetry::{CacheCounters, Counter, CounterDiff};
//!
//! let counters = CacheCounters::new();
//! let before = counters.snapshot();
//! counters.record(Counter::CacheMiss);
//! counters.record(Counter::HelperDefinitionCount);
//!
//! let changes = counters.snapshot().diff(&before);
//! assert_eq!(
//!     changes,
//!     CounterDiff::from_expected([
//!         (Counter::CacheMiss, 1),
//!         (Counter::HelperDefinitionCount, 1),
//!         (Counter::CacheHit, 0),
//!     ])
//! );
//! assert_eq!(changes.to_string(), "{cacheMiss: +1, helperDefinitionCount: +1}");
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

/// Names of the four counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Counter {
    CacheHit,
    CacheMiss,
    ComponentDefinitionCount,
    HelperDefinitionCount,
}

impl Counter {
    /// All counters in display order.
    pub const ALL: [Counter; 4] = [
        Counter::CacheHit,
        Counter::CacheMiss,
        Counter::ComponentDefinitionCount,
        Counter::HelperDefinitionCount,
    ];

    /// camelCase name, as serialized.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CacheHit => "cacheHit",
            Self::CacheMiss => "cacheMiss",
            Self::ComponentDefinitionCount => "componentDefinitionCount",
            Self::HelperDefinitionCount => "helperDefinitionCount",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of the four cache counters.
///
/// Atomics let the process-wide instance live in a static; the cache itself
/// is single-threaded.
#[derive(Debug, Default)]
pub struct CacheCounters {
    cache_hit: AtomicU64,
    cache_miss: AtomicU64,
    component_definition_count: AtomicU64,
    helper_definition_count: AtomicU64,
}

static GLOBAL_COUNTERS: LazyLock<Arc<CacheCounters>> =
    LazyLock::new(|| Arc::new(CacheCounters::new()));

/// The process-wide counter set.
#[must_use]
pub fn global_counters() -> Arc<CacheCounters> {
    Arc::clone(&GLOBAL_COUNTERS)
}

/// Snapshot of the process-wide counters.
#[must_use]
pub fn snapshot() -> CounterSnapshot {
    GLOBAL_COUNTERS.snapshot()
}

impl CacheCounters {
    /// A fresh, zeroed counter set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache_hit: AtomicU64::new(0),
            cache_miss: AtomicU64::new(0),
            component_definition_count: AtomicU64::new(0),
            helper_definition_count: AtomicU64::new(0),
        }
    }

    const fn slot(&self, counter: Counter) -> &AtomicU64 {
        match counter {
            Counter::CacheHit => &self.cache_hit,
            Counter::CacheMiss => &self.cache_miss,
            Counter::ComponentDefinitionCount => &self.component_definition_count,
            Counter::HelperDefinitionCount => &self.helper_definition_count,
        }
    }

    /// Increment one counter by one.
    pub fn record(&self, counter: Counter) {
        self.slot(counter).fetch_add(1, Ordering::Relaxed);
    }

    /// Current value of one counter.
    #[must_use]
    pub fn get(&self, counter: Counter) -> u64 {
        self.slot(counter).load(Ordering::Relaxed)
    }

    /// Copy all four values.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            cache_hit: self.get(Counter::CacheHit),
            cache_miss: self.get(Counter::CacheMiss),
            component_definition_count: self.get(Counter::ComponentDefinitionCount),
            helper_definition_count: self.get(Counter::HelperDefinitionCount),
        }
    }

    /// Zero every counter. Test harnesses only.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn reset(&self) {
        for counter in Counter::ALL {
            self.slot(counter).store(0, Ordering::Relaxed);
        }
    }
}

/// Point-in-time copy of a [`CacheCounters`] set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterSnapshot {
    pub cache_hit: u64,
    pub cache_miss: u64,
    pub component_definition_count: u64,
    pub helper_definition_count: u64,
}

impl CounterSnapshot {
    /// Value of one counter in this snapshot.
    #[must_use]
    pub const fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::CacheHit => self.cache_hit,
            Counter::CacheMiss => self.cache_miss,
            Counter::ComponentDefinitionCount => self.component_definition_count,
            Counter::HelperDefinitionCount => self.helper_definition_count,
        }
    }

    /// Changes from `earlier` to `self`, keeping only non-zero deltas.
    #[must_use]
    pub fn diff(&self, earlier: &CounterSnapshot) -> CounterDiff {
        CounterDiff::from_expected(Counter::ALL.into_iter().map(|counter| {
            let delta = i128::from(self.get(counter)) - i128::from(earlier.get(counter));
            let delta = i64::try_from(delta).unwrap_or(if delta > 0 { i64::MAX } else { i64::MIN });
            (counter, delta)
        }))
    }

    /// Hit rate as a percentage of all lookups.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hit + self.cache_miss;
        if total == 0 {
            0.0
        } else {
            (self.cache_hit as f64 / total as f64) * 100.0
        }
    }
}

/// Non-zero counter deltas between two snapshots.
///
/// Serializes as a JSON object keyed by camelCase counter names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CounterDiff(BTreeMap<Counter, i64>);

impl CounterDiff {
    /// Build a diff from `(counter, delta)` pairs, dropping zero deltas.
    ///
    /// Repeated counters are summed.
    pub fn from_expected(changes: impl IntoIterator<Item = (Counter, i64)>) -> Self {
        let mut map = BTreeMap::new();
        for (counter, delta) in changes {
            *map.entry(counter).or_insert(0) += delta;
        }
        map.retain(|_, delta| *delta != 0);
        Self(map)
    }

    /// Whether no counter moved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Delta for one counter, zero if it did not move.
    #[must_use]
    pub fn get(&self, counter: Counter) -> i64 {
        self.0.get(&counter).copied().unwrap_or(0)
    }

    /// Non-zero deltas in counter order.
    pub fn iter(&self) -> impl Iterator<Item = (Counter, i64)> + '_ {
        self.0.iter().map(|(counter, delta)| (*counter, *delta))
    }
}

impl fmt::Display for CounterDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (counter, delta)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{counter}: {delta:+}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_records() {
        let counters = CacheCounters::new();
        counters.record(Counter::CacheHit);
        counters.record(Counter::CacheHit);
        counters.record(Counter::ComponentDefinitionCount);

        let snap = counters.snapshot();
        assert_eq!(snap.cache_hit, 2);
        assert_eq!(snap.cache_miss, 0);
        assert_eq!(snap.component_definition_count, 1);
        assert_eq!(snap.get(Counter::HelperDefinitionCount), 0);
    }

    #[test]
    fn test_diff_only_keeps_moved_counters() {
        let counters = CacheCounters::new();
        counters.record(Counter::CacheMiss);
        let before = counters.snapshot();

        assert!(counters.snapshot().diff(&before).is_empty());

        counters.record(Counter::HelperDefinitionCount);
        let diff = counters.snapshot().diff(&before);
        assert_eq!(diff.iter().collect::<Vec<_>>(), vec![(Counter::HelperDefinitionCount, 1)]);
        assert_eq!(diff.get(Counter::CacheMiss), 0);
    }

    #[test]
    fn test_diff_against_later_snapshot_is_negative() {
        let counters = CacheCounters::new();
        let before = counters.snapshot();
        counters.record(Counter::CacheHit);
        let after = counters.snapshot();

        assert_eq!(before.diff(&after).get(Counter::CacheHit), -1);
    }

    #[test]
    fn test_from_expected_strips_zeroes() {
        let diff = CounterDiff::from_expected([
            (Counter::ComponentDefinitionCount, 1),
            (Counter::CacheHit, 0),
        ]);
        assert_eq!(diff.iter().count(), 1);
        assert_eq!(CounterDiff::from_expected([(Counter::CacheHit, 0)]), CounterDiff::default());
    }

    #[test]
    fn test_diff_display_and_json() {
        let diff = CounterDiff::from_expected([
            (Counter::HelperDefinitionCount, 1),
            (Counter::CacheMiss, 1),
        ]);
        assert_eq!(diff.to_string(), "{cacheMiss: +1, helperDefinitionCount: +1}");
        assert_eq!(CounterDiff::default().to_string(), "{}");

        let json = serde_json::to_string(&diff).unwrap();
        assert_eq!(json, r#"{"cacheMiss":1,"helperDefinitionCount":1}"#);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snap = CounterSnapshot {
            cache_hit: 3,
            ..CounterSnapshot::default()
        };
        let json = serde_json::to_value(snap).unwrap();
        assert_eq!(json["cacheHit"], 3);
        assert_eq!(json["componentDefinitionCount"], 0);
    }

    #[test]
    fn test_hit_rate() {
        assert_eq!(CounterSnapshot::default().hit_rate(), 0.0);
        let snap = CounterSnapshot {
            cache_hit: 3,
            cache_miss: 1,
            ..CounterSnapshot::default()
        };
        assert_eq!(snap.hit_rate(), 75.0);
    }

    #[test]
    fn test_diff_saturates_large_deltas() {
        let huge = CounterSnapshot {
            cache_hit: u64::MAX,
            ..CounterSnapshot::default()
        };
        let zero = CounterSnapshot::default();
        assert_eq!(huge.diff(&zero).get(Counter::CacheHit), i64::MAX);
        assert_eq!(zero.diff(&huge).get(Counter::CacheHit), i64::MIN);

        let near = CounterSnapshot {
            cache_hit: u64::MAX - 2,
            ..CounterSnapshot::default()
        };
        assert_eq!(huge.diff(&near).get(Counter::CacheHit), 2);
    }

    #[test]
    fn test_reset() {
        let counters = CacheCounters::new();
        counters.record(Counter::CacheMiss);
        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
