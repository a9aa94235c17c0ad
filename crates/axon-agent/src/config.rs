//! Agent configuration and retry policy.

use axon_types::AgentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Immutable per-agent configuration.
///
/// The `id` is the sole identity key: an orchestrator refuses a second
/// registration under the same id. Everything else is descriptive or
/// advisory. The registered copy is never handed out by reference;
/// accessors clone, so callers cannot mutate a live registration.
///
/// # Example
///
/// ```
/// use axon_agent::{AgentConfig, RetryPolicy};
///
/// let config = AgentConfig::new("fetcher", "Page Fetcher", "io")
///     .with_timeout_ms(5_000)
///     .with_retry_policy(RetryPolicy {
///         max_attempts: 3,
///         initial_delay_ms: 100,
///         backoff_multiplier: 2.0,
///         max_delay_ms: 1_000,
///     })
///     .with_fallback_agent("fetcher-cache");
///
/// assert_eq!(config.id.as_str(), "fetcher");
/// assert_eq!(config.timeout_ms, Some(5_000));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique identity within an orchestrator. Non-empty.
    pub id: AgentId,

    /// Human-readable name.
    pub name: String,

    /// Free-form agent type, e.g. `"io"`, `"llm"`, `"batch"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Per-execution timeout hint in milliseconds.
    ///
    /// The base execution contract does not enforce it; enforcement
    /// belongs to the retry/circuit layer and the transport.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Retry policy applied by the fallback layer. Absent means one
    /// attempt, no retries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_policy: Option<RetryPolicy>,

    /// Agent to invoke when this agent's retry sequence is exhausted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_agent: Option<AgentId>,

    /// Advisory memory hint in MiB. The kernel never acts on it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_hint_mb: Option<u64>,

    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl AgentConfig {
    /// Creates a configuration with the required fields only.
    #[must_use]
    pub fn new(id: impl Into<AgentId>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            timeout_ms: None,
            retry_policy: None,
            fallback_agent: None,
            memory_hint_mb: None,
            metadata: HashMap::new(),
        }
    }

    /// Sets the per-execution timeout hint.
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Names the fallback agent.
    #[must_use]
    pub fn with_fallback_agent(mut self, fallback: impl Into<AgentId>) -> Self {
        self.fallback_agent = Some(fallback.into());
        self
    }

    /// Sets the advisory memory hint.
    #[must_use]
    pub fn with_memory_hint_mb(mut self, mib: u64) -> Self {
        self.memory_hint_mb = Some(mib);
        self
    }

    /// Inserts one metadata entry.
    #[must_use]
    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Bounded exponential backoff for the retry layer.
///
/// The delay before attempt `i + 1` is
/// `min(initial_delay_ms · backoff_multiplier^i, max_delay_ms)`.
///
/// # Field Constraints
///
/// | Field | Constraint |
/// |-------|------------|
/// | `max_attempts` | ≥ 1 (values of 0 are treated as 1) |
/// | `initial_delay_ms` | ≥ 0 |
/// | `backoff_multiplier` | ≥ 1.0 |
/// | `max_delay_ms` | ≥ `initial_delay_ms` |
///
/// # Example
///
/// ```
/// use axon_agent::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy {
///     max_attempts: 4,
///     initial_delay_ms: 100,
///     backoff_multiplier: 2.0,
///     max_delay_ms: 300,
/// };
///
/// assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
/// assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
/// // Capped at max_delay_ms.
/// assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(300));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,

    /// Delay before the first retry, in milliseconds.
    pub initial_delay_ms: u64,

    /// Multiplier applied to the delay after each attempt.
    pub backoff_multiplier: f64,

    /// Upper bound on any single delay, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    /// One attempt, no retries: the behavior of an absent policy.
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay_ms: 1_000,
            backoff_multiplier: 2.0,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Effective attempt count; a configured 0 means 1.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after attempt `attempt` (0-based) fails.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.max(1.0);
        let delay = self.initial_delay_ms as f64 * multiplier.powi(attempt as i32);
        Duration::from_millis(delay.min(self.max_delay_ms as f64) as u64)
    }
}
