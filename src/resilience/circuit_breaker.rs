//! Circuit breaker for provider protection.
//!
//! # States
//! - Closed: normal operation, sends pass through
//! - Open: provider assumed down, sends are skipped
//! - Half-Open: trial sends allowed to probe recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold
//! Open → Half-Open: reset_timeout elapsed since last failure (checked by can_execute)
//! Half-Open → Closed: trial send succeeds
//! Half-Open → Open: trial send fails
//! any → Closed: manual reset
//! ```
//!
//! One breaker per provider, shared by every in-flight send. State and
//! counter live behind a single mutex so a threshold check and the
//! increment that feeds it are one critical section.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::resilience::clock::{Clock, SystemClock};

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "CLOSED",
            BreakerState::Open => "OPEN",
            BreakerState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds for a single breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    /// Consecutive failures tolerated before opening. Always at least 1.
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial is allowed.
    pub reset_timeout: Duration,
}

impl BreakerSettings {
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
        }
    }
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(30))
    }
}

/// Read-only snapshot for health and status endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakerStatus {
    pub state: BreakerState,
    pub failure_count: u32,
    pub can_execute: bool,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Per-provider circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    settings: BreakerSettings,
    clock: Arc<dyn Clock>,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a closed breaker reading the system clock.
    pub fn new(name: impl Into<String>, settings: BreakerSettings) -> Self {
        Self::with_clock(name, settings, Arc::new(SystemClock))
    }

    /// Create a closed breaker with an injected clock.
    pub fn with_clock(
        name: impl Into<String>,
        settings: BreakerSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let name = name.into();
        metrics::record_circuit_state(&name, BreakerState::Closed);
        Self {
            name,
            settings,
            clock,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                failure_count: 0,
                last_failure: None,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> BreakerSettings {
        self.settings
    }

    /// Decide whether a call may proceed.
    ///
    /// This is the only place an open circuit is left: once `reset_timeout`
    /// has elapsed since the last failure the breaker moves to Half-Open and
    /// the call is allowed.
    pub fn can_execute(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                if self.cooldown_elapsed(&inner) {
                    self.transition(&mut inner, BreakerState::HalfOpen);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::HalfOpen => {
                inner.failure_count = 0;
                self.transition(&mut inner, BreakerState::Closed);
            }
            BreakerState::Closed => inner.failure_count = 0,
            // Open blocks execution, so a success here is a straggler from
            // before the circuit opened.
            BreakerState::Open => {}
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        let now = self.clock.now();
        match inner.state {
            BreakerState::Closed => {
                inner.failure_count += 1;
                inner.last_failure = Some(now);
                if inner.failure_count >= self.settings.failure_threshold {
                    self.transition(&mut inner, BreakerState::Open);
                }
            }
            BreakerState::HalfOpen => {
                inner.failure_count += 1;
                inner.last_failure = Some(now);
                self.transition(&mut inner, BreakerState::Open);
            }
            BreakerState::Open => {
                // Straggler from a call admitted before the circuit opened:
                // restart the cooldown, leave the count alone.
                inner.last_failure = Some(now);
            }
        }
    }

    /// Snapshot without side effects.
    ///
    /// `can_execute` is advisory: it reports whether a call would be let
    /// through right now but never moves Open to Half-Open.
    pub fn status(&self) -> BreakerStatus {
        let inner = self.lock();
        let can_execute = match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => self.cooldown_elapsed(&inner),
        };
        BreakerStatus {
            state: inner.state,
            failure_count: inner.failure_count,
            can_execute,
        }
    }

    /// Force the breaker closed and forget all failure history.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.failure_count = 0;
        inner.last_failure = None;
        if inner.state != BreakerState::Closed {
            self.transition(&mut inner, BreakerState::Closed);
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cooldown_elapsed(&self, inner: &BreakerInner) -> bool {
        match inner.last_failure {
            Some(at) => self.clock.now().saturating_duration_since(at) >= self.settings.reset_timeout,
            None => true,
        }
    }

    fn transition(&self, inner: &mut BreakerInner, to: BreakerState) {
        let from = inner.state;
        inner.state = to;
        match to {
            BreakerState::Open => tracing::warn!(
                provider = %self.name,
                from = %from,
                failure_count = inner.failure_count,
                reset_timeout_secs = self.settings.reset_timeout.as_secs(),
                "Circuit opened"
            ),
            _ => tracing::info!(
                provider = %self.name,
                from = %from,
                to = %to,
                "Circuit state changed"
            ),
        }
        metrics::record_circuit_state(&self.name, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::clock::ManualClock;

    fn breaker(threshold: u32, timeout_secs: u64) -> (CircuitBreaker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cb = CircuitBreaker::with_clock(
            "test",
            BreakerSettings::new(threshold, Duration::from_secs(timeout_secs)),
            clock.clone(),
        );
        (cb, clock)
    }

    #[test]
    fn test_starts_closed() {
        let (cb, _) = breaker(3, 30);
        assert_eq!(cb.state(), BreakerState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert!(cb.can_execute());
    }

    #[test]
    fn test_opens_exactly_at_threshold() {
        for threshold in 1..=6 {
            let (cb, _) = breaker(threshold, 30);
            for call in 1..=threshold {
                cb.record_failure();
                let expected = if call == threshold {
                    BreakerState::Open
                } else {
                    BreakerState::Closed
                };
                assert_eq!(cb.state(), expected, "threshold {threshold}, call {call}");
            }
        }
    }

    #[test]
    fn test_open_blocks_until_timeout() {
        let (cb, clock) = breaker(2, 30);
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Open);

        clock.advance(Duration::from_secs(29));
        assert!(!cb.can_execute());
        assert_eq!(cb.state(), BreakerState::Open);

        clock.advance(Duration::from_secs(1));
        assert!(cb.can_execute());
        assert_eq!(cb.state(), BreakerState::HalfOpen);
    }

    #[test]
    fn test_zero_timeout_allows_trial_immediately() {
        let (cb, _) = breaker(1, 0);
        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Open);
        assert!(cb.can_execute());
        assert_eq!(cb.state(), BreakerState::HalfOpen);
    }

    #[test]
    fn test_half_open_success_closes() {
        let (cb, clock) = breaker(3, 10);
        for _ in 0..3 {
            cb.record_failure();
        }
        clock.advance(Duration::from_secs(10));
        assert!(cb.can_execute());

        cb.record_success();
        assert_eq!(
            cb.status(),
            BreakerStatus {
                state: BreakerState::Closed,
                failure_count: 0,
                can_execute: true,
            }
        );
    }

    #[test]
    fn test_half_open_failure_reopens_and_restarts_clock() {
        let (cb, clock) = breaker(2, 10);
        cb.record_failure();
        cb.record_failure();
        clock.advance(Duration::from_secs(10));
        assert!(cb.can_execute());

        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Open);
        assert!(cb.failure_count() >= 2);

        clock.advance(Duration::from_secs(9));
        assert!(!cb.can_execute());
        clock.advance(Duration::from_secs(1));
        assert!(cb.can_execute());
    }

    #[test]
    fn test_success_clears_failure_history() {
        let (cb, _) = breaker(3, 30);
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        assert_eq!(cb.failure_count(), 0);

        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Closed);
    }

    #[test]
    fn test_open_ignores_stragglers() {
        let (cb, clock) = breaker(1, 10);
        cb.record_failure();
        cb.record_success();
        assert_eq!(cb.state(), BreakerState::Open);
        assert_eq!(cb.failure_count(), 1);

        clock.advance(Duration::from_secs(8));
        cb.record_failure();
        assert_eq!(cb.failure_count(), 1);
        clock.advance(Duration::from_secs(8));
        assert!(!cb.can_execute(), "late failure restarts the cooldown");
    }

    #[test]
    fn test_reset_from_any_state() {
        let (cb, clock) = breaker(1, 10);

        cb.record_failure();
        cb.reset();
        assert_eq!(cb.state(), BreakerState::Closed);
        assert_eq!(cb.failure_count(), 0);

        cb.record_failure();
        clock.advance(Duration::from_secs(10));
        assert!(cb.can_execute());
        assert_eq!(cb.state(), BreakerState::HalfOpen);
        cb.reset();
        assert_eq!(cb.state(), BreakerState::Closed);
        assert_eq!(cb.failure_count(), 0);
        assert!(cb.can_execute());
    }

    #[test]
    fn test_status_is_side_effect_free() {
        let (cb, clock) = breaker(1, 5);
        cb.record_failure();
        assert!(!cb.status().can_execute);

        clock.advance(Duration::from_secs(5));
        let status = cb.status();
        assert!(status.can_execute);
        assert_eq!(status.state, BreakerState::Open);
        assert_eq!(cb.state(), BreakerState::Open);
    }

    #[test]
    fn test_threshold_three_scenario() {
        let (cb, clock) = breaker(3, 30);
        cb.record_failure();
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), BreakerState::Open);

        clock.advance(Duration::from_secs(30));
        assert!(cb.can_execute());
        assert_eq!(cb.state(), BreakerState::HalfOpen);

        cb.record_success();
        let status = cb.status();
        assert_eq!(status.state, BreakerState::Closed);
        assert_eq!(status.failure_count, 0);
    }

    #[test]
    fn test_concurrent_failures_are_not_lost() {
        let threshold = 50;
        let cb = Arc::new(CircuitBreaker::with_clock(
            "concurrent",
            BreakerSettings::new(threshold, Duration::from_secs(30)),
            Arc::new(ManualClock::new()),
        ));

        let handles: Vec<_> = (0..threshold)
            .map(|_| {
                let cb = cb.clone();
                std::thread::spawn(move || cb.record_failure())
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(cb.state(), BreakerState::Open);
        assert_eq!(cb.failure_count(), threshold);
    }

    #[test]
    fn test_state_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&BreakerState::HalfOpen).unwrap(), "\"HALF_OPEN\"");
        assert_eq!(BreakerState::Open.to_string(), "OPEN");
    }

    #[test]
    fn test_threshold_is_at_least_one() {
        assert_eq!(BreakerSettings::new(0, Duration::ZERO).failure_threshold, 1);
    }
}
