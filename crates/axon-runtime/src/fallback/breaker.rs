//! Three-state circuit breaker.
//!
//! ```text
//!            failure_count >= threshold
//!   CLOSED ───────────────────────────────► OPEN
//!     ▲                                      │
//!     │ success_count >=                     │ gate request after
//!     │ half_open_successes                  │ open_timeout
//!     │                                      ▼
//!     └────────────────────────────── HALF_OPEN
//!                     ▲                      │
//!                     └──────────────────────┘
//!                        failure → OPEN again
//! ```
//!
//! The breaker counts raised failures only. A returned result with
//! `success == false` never reaches the gate: the retry layer converts an
//! exhausted sequence of logical failures into one raised failure at its
//! boundary, so the breaker observes exactly one failure per exhausted
//! call.

use super::error::BreakerError;
use axon_agent::{ErrorInfo, ExecutionResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Breaker tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures that trip the circuit.
    pub threshold: u32,

    /// How long the circuit stays open before probing, in milliseconds.
    pub open_timeout_ms: u64,

    /// Successes required in half-open to close the circuit.
    pub half_open_successes: u32,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            open_timeout_ms: 60_000,
            half_open_successes: 3,
        }
    }
}

/// The three circuit states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation; calls pass through.
    Closed,
    /// Tripped; calls are refused until the open timeout elapses.
    Open,
    /// Probing; calls pass through while the breaker counts successes.
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Point-in-time view of a breaker, for introspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitSnapshot {
    /// Current state.
    pub state: CircuitState,
    /// Consecutive failures observed in the closed state.
    pub failure_count: u32,
    /// Successes observed in the half-open state.
    pub success_count: u32,
}

struct Inner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_at: Option<Instant>,
}

/// Per-agent circuit breaker.
///
/// All transitions are atomic under one lock; the lock is never held
/// across the wrapped call.
///
/// # Example
///
/// ```
/// use axon_agent::{ErrorInfo, ExecutionMetrics, ExecutionResult};
/// use axon_runtime::{BreakerConfig, CircuitBreaker, CircuitState};
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let breaker = CircuitBreaker::new(BreakerConfig {
///     threshold: 1,
///     open_timeout_ms: 60_000,
///     half_open_successes: 1,
/// });
///
/// // One raised failure trips a threshold-1 breaker.
/// let _ = breaker
///     .gate(async { Err(ErrorInfo::new("AGENT_ERROR", "down")) })
///     .await;
/// assert_eq!(breaker.state(), CircuitState::Open);
///
/// // The next gate refuses without running the call.
/// let refused = breaker
///     .gate(async {
///         Ok(ExecutionResult::success(json!(1), ExecutionMetrics::default()))
///     })
///     .await;
/// assert_eq!(refused.unwrap_err().code, "CIRCUIT_OPEN");
/// # });
/// ```
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    /// Creates a closed breaker with the given tuning.
    #[must_use]
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_at: None,
            }),
        }
    }

    /// Current state, without side effects.
    ///
    /// An open breaker past its timeout still reports `Open` here; the
    /// open → half-open transition happens on the next gate request.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Point-in-time counters and state.
    #[must_use]
    pub fn snapshot(&self) -> CircuitSnapshot {
        let inner = self.inner.lock();
        CircuitSnapshot {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
        }
    }

    /// Evaluates `call` under the circuit.
    ///
    /// A raised failure (`Err`) counts against the circuit; a returned
    /// result counts as success. While open and inside the timeout, the
    /// call is not polled and `CIRCUIT_OPEN` is raised instead.
    pub async fn gate<F>(&self, call: F) -> Result<ExecutionResult, ErrorInfo>
    where
        F: Future<Output = Result<ExecutionResult, ErrorInfo>>,
    {
        if let Err(refusal) = self.try_acquire() {
            return Err(ErrorInfo::from(&refusal));
        }

        match call.await {
            Ok(result) => {
                self.on_success();
                Ok(result)
            }
            Err(err) => {
                self.on_failure();
                Err(err)
            }
        }
    }

    fn try_acquire(&self) -> Result<(), BreakerError> {
        let mut inner = self.inner.lock();
        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let timeout = Duration::from_millis(self.config.open_timeout_ms);
        let elapsed = inner
            .last_failure_at
            .map_or(timeout, |at| at.elapsed());

        if elapsed >= timeout {
            inner.state = CircuitState::HalfOpen;
            inner.success_count = 0;
            debug!("circuit half-open, probing");
            Ok(())
        } else {
            let remaining = timeout - elapsed;
            Err(BreakerError::Open {
                remaining_ms: remaining.as_millis() as u64,
            })
        }
    }

    fn on_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.half_open_successes {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    debug!("circuit closed after recovery");
                }
            }
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.threshold {
                    inner.state = CircuitState::Open;
                    inner.last_failure_at = Some(Instant::now());
                    warn!(failures = inner.failure_count, "circuit opened");
                }
            }
            CircuitState::HalfOpen => {
                // The probe failed; back to open with a fresh timeout.
                inner.state = CircuitState::Open;
                inner.last_failure_at = Some(Instant::now());
                warn!("circuit re-opened from half-open");
            }
            CircuitState::Open => {
                inner.last_failure_at = Some(Instant::now());
            }
        }
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axon_agent::ExecutionMetrics;
    use serde_json::json;

    fn ok_result() -> Result<ExecutionResult, ErrorInfo> {
        Ok(ExecutionResult::success(
            json!(1),
            ExecutionMetrics::default(),
        ))
    }

    fn raised() -> Result<ExecutionResult, ErrorInfo> {
        Err(ErrorInfo::new("AGENT_ERROR", "down"))
    }

    fn breaker(threshold: u32, open_timeout_ms: u64, half_open_successes: u32) -> CircuitBreaker {
        CircuitBreaker::new(BreakerConfig {
            threshold,
            open_timeout_ms,
            half_open_successes,
        })
    }

    #[tokio::test]
    async fn starts_closed() {
        let b = CircuitBreaker::default();
        assert_eq!(b.state(), CircuitState::Closed);
        assert_eq!(b.snapshot().failure_count, 0);
    }

    #[tokio::test]
    async fn opens_at_threshold() {
        let b = breaker(3, 60_000, 1);

        for _ in 0..2 {
            let _ = b.gate(async { raised() }).await;
        }
        assert_eq!(b.state(), CircuitState::Closed);

        let _ = b.gate(async { raised() }).await;
        assert_eq!(b.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn success_resets_consecutive_failures() {
        let b = breaker(3, 60_000, 1);

        let _ = b.gate(async { raised() }).await;
        let _ = b.gate(async { raised() }).await;
        let _ = b.gate(async { ok_result() }).await;
        assert_eq!(b.snapshot().failure_count, 0);

        // Two more failures are again below the threshold.
        let _ = b.gate(async { raised() }).await;
        let _ = b.gate(async { raised() }).await;
        assert_eq!(b.state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn open_gate_refuses_without_invoking() {
        let b = breaker(1, 60_000, 1);
        let _ = b.gate(async { raised() }).await;
        assert_eq!(b.state(), CircuitState::Open);

        let mut invoked = false;
        let refusal = b
            .gate(async {
                invoked = true;
                ok_result()
            })
            .await
            .unwrap_err();

        assert_eq!(refusal.code, "CIRCUIT_OPEN");
        assert!(!invoked);
    }

    #[tokio::test]
    async fn half_open_after_timeout_then_closes() {
        let b = breaker(1, 30, 2);
        let _ = b.gate(async { raised() }).await;
        assert_eq!(b.state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(40)).await;

        // First probe passes through and succeeds.
        let probe = b.gate(async { ok_result() }).await;
        assert!(probe.is_ok());
        assert_eq!(b.state(), CircuitState::HalfOpen);
        assert_eq!(b.snapshot().success_count, 1);

        // Second success reaches half_open_successes and closes.
        let _ = b.gate(async { ok_result() }).await;
        assert_eq!(b.state(), CircuitState::Closed);
        assert_eq!(b.snapshot().failure_count, 0);
    }

    #[tokio::test]
    async fn half_open_failure_reopens() {
        let b = breaker(1, 30, 2);
        let _ = b.gate(async { raised() }).await;

        tokio::time::sleep(Duration::from_millis(40)).await;

        let _ = b.gate(async { raised() }).await;
        assert_eq!(b.state(), CircuitState::Open);

        // And the fresh timeout applies.
        let refusal = b.gate(async { ok_result() }).await.unwrap_err();
        assert_eq!(refusal.code, "CIRCUIT_OPEN");
    }

    #[tokio::test]
    async fn raised_error_passes_through_unchanged() {
        let b = breaker(5, 60_000, 1);
        let err = b.gate(async { raised() }).await.unwrap_err();
        assert_eq!(err.code, "AGENT_ERROR");
    }

    #[test]
    fn state_display() {
        assert_eq!(CircuitState::Closed.to_string(), "closed");
        assert_eq!(CircuitState::HalfOpen.to_string(), "half_open");
    }

    #[test]
    fn state_serde() {
        assert_eq!(
            serde_json::to_string(&CircuitState::HalfOpen).unwrap(),
            "\"HALF_OPEN\""
        );
    }
}
