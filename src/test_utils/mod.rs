//! Test utilities for defcache
//!
//! Available with the `test-utils` feature (enabled for this crate's own
//! integration tests through its dev-dependency on itself).
//!
//! - [`init_test_logging`] - once-only tracing setup for tests
//! - [`CounterProbe`] - snapshot the cache counters and assert what changed
//!   between steps of a test
//!
//! Tests that probe the process-wide counters must not run in parallel with
//! other tests that touch them; mark them `#[serial]`.

use std::sync::{Arc, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::telemetry::{CacheCounters, Counter, CounterDiff, CounterSnapshot, global_counters};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` if given, otherwise `RUST_LOG` if set; does nothing if neither
/// is available.
///
/// ```bash
/// RUST_LOG=defcache=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}

/// Step-by-step observer of a counter set.
///
/// # Example
///
/// ```rust,no_run
/// use defcache::telemetry::Counter;
/// use defcache::test_utils::CounterProbe;
///
/// let mut probe = CounterProbe::global();
/// // ... render something for the first time ...
/// probe.expect_changes(
///     &[(Counter::HelperDefinitionCount, 1), (Counter::CacheMiss, 1)],
///     "first render compiles",
/// );
/// // ... render it again ...
/// probe.expect_changes(&[(Counter::CacheHit, 1)], "second render hits");
/// ```
#[derive(Debug)]
pub struct CounterProbe {
    counters: Arc<CacheCounters>,
    last: CounterSnapshot,
}

impl CounterProbe {
    /// Probe the process-wide counters, starting from their current values.
    #[must_use]
    pub fn global() -> Self {
        Self::new(global_counters())
    }

    /// Probe a private counter set, starting from its current values.
    #[must_use]
    pub fn new(counters: Arc<CacheCounters>) -> Self {
        let last = counters.snapshot();
        Self {
            counters,
            last,
        }
    }

    /// Changes since the last call (or construction), then re-snapshot.
    pub fn changes(&mut self) -> CounterDiff {
        let current = self.counters.snapshot();
        let diff = current.diff(&self.last);
        self.last = current;
        diff
    }

    /// Assert the changes since the last call. Zero entries in `expected` are ignored.
    ///
    /// # Panics
    ///
    /// Panics with `message` if the observed changes differ.
    pub fn expect_changes(&mut self, expected: &[(Counter, i64)], message: &str) {
        let actual = self.changes();
        let expected = CounterDiff::from_expected(expected.iter().copied());
        assert_eq!(actual, expected, "{message}: expected {expected}, got {actual}");
    }
}
