//! Execution outcome types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Outcome of one framed execution.
///
/// Tagged by `success`: either `data` is present, or `error` is. Metrics
/// are populated on both paths: a failed execution still reports how long
/// it took and how often it was retried.
///
/// # Example
///
/// ```
/// use axon_agent::{ErrorInfo, ExecutionMetrics, ExecutionResult};
/// use serde_json::json;
///
/// let ok = ExecutionResult::success(json!({"done": true}), ExecutionMetrics::default());
/// assert!(ok.success);
///
/// let failed = ExecutionResult::failure(
///     ErrorInfo::new("AGENT_ERROR", "boom"),
///     ExecutionMetrics::default(),
/// );
/// assert_eq!(failed.error_code(), Some("AGENT_ERROR"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the execution succeeded.
    pub success: bool,

    /// Output of the agent body on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Failure description on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,

    /// Always populated.
    pub metrics: ExecutionMetrics,
}

impl ExecutionResult {
    /// A successful result carrying `data`.
    #[must_use]
    pub fn success(data: Value, metrics: ExecutionMetrics) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metrics,
        }
    }

    /// A failed result carrying `error`.
    #[must_use]
    pub fn failure(error: ErrorInfo, metrics: ExecutionMetrics) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            metrics,
        }
    }

    /// The stable code of the failure, if any.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}

/// Stable description of a failure.
///
/// `code` is the machine contract (see the taxonomy in `axon-types`);
/// `message` is diagnostics only; `details` optionally carries structured
/// context such as the underlying cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable UPPER_SNAKE_CASE failure code.
    pub code: String,

    /// Human-readable diagnostics. Not part of the contract.
    pub message: String,

    /// Optional structured context, e.g. `{"cause": "CIRCUIT_OPEN"}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorInfo {
    /// Creates an error description.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Measurements collected around one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    /// Wall-clock duration of the framed execution.
    pub execution_time_ms: u64,

    /// Observed memory use, when the integration reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_used: Option<u64>,

    /// Retries performed by the fallback layer before this outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,

    /// Messages this agent has processed so far, on message-triggered
    /// executions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages_processed: Option<u32>,
}

impl ExecutionMetrics {
    /// Metrics carrying only an elapsed duration.
    #[must_use]
    pub fn timed(elapsed: Duration) -> Self {
        Self {
            execution_time_ms: elapsed.as_millis() as u64,
            ..Self::default()
        }
    }
}
