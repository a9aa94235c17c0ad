//! Bounded retry with exponential backoff.

use axon_agent::{ErrorInfo, ExecutionResult, RetryPolicy};
use std::future::Future;
use tracing::debug;

/// Drives `call` up to `policy.attempts()` times.
///
/// A returned result with `success == true` wins immediately and is
/// stamped with `metrics.retry_count = <attempt index>`. Logical failures
/// (`success == false`) are remembered; between attempts the loop waits
/// `min(initial · multiplier^i, max)`. After the last attempt, the last
/// failure is raised so the circuit breaker above sees exactly one
/// failure for the whole sequence.
pub(crate) async fn run_with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut call: F,
) -> Result<ExecutionResult, ErrorInfo>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ExecutionResult>,
{
    let attempts = policy.attempts();
    let mut last_error: Option<ErrorInfo> = None;

    for attempt in 0..attempts {
        let mut result = call().await;

        if result.success {
            result.metrics.retry_count = Some(attempt);
            return Ok(result);
        }

        let error = result
            .error
            .take()
            .unwrap_or_else(|| ErrorInfo::new("UNKNOWN_ERROR", "failure without error info"));
        debug!(attempt, code = %error.code, "attempt failed");
        last_error = Some(error);

        if attempt + 1 < attempts {
            tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| ErrorInfo::new("UNKNOWN_ERROR", "retry loop made no attempts")))
}
