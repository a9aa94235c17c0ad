//! Lifecycle framing around an agent body.

use crate::{
    Agent, AgentConfig, AgentStatus, Context, ErrorInfo, ExecutionMetrics, ExecutionResult,
};
use axon_message::Message;
use axon_types::{AgentId, ErrorCode};
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Kernel-owned cell that frames every execution of one agent.
///
/// The handle owns the observable status and applies the lifecycle
/// contract around the user body:
///
/// 1. status → [`Running`](AgentStatus::Running), clock starts
/// 2. the body runs (panics are captured, not propagated)
/// 3. status → [`Completed`](AgentStatus::Completed) or
///    [`Failed`](AgentStatus::Failed), metrics recorded
/// 4. [`Agent::cleanup`] on every exit path, including cancellation,
///    where a drop guard performs the status transition and cleanup when
///    the in-flight future is dropped at a suspension point
///
/// [`execute`](Self::execute) never retries, never times out, and never
/// consults a circuit breaker; those belong to the fallback layer above.
///
/// # Status Races
///
/// The kernel admits concurrent executions of the same id when asked to;
/// both then write this handle's single status field. That race is a
/// documented limitation of the shared-status model; agents that need
/// per-invocation status should register distinct ids.
pub struct AgentHandle {
    agent: Arc<dyn Agent>,
    status: Mutex<AgentStatus>,
    messages_processed: AtomicU32,
}

enum Call<'a> {
    Run(Value),
    Message(&'a Message),
}

impl AgentHandle {
    /// Wraps an agent in lifecycle framing. Status starts
    /// [`Idle`](AgentStatus::Idle).
    #[must_use]
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            agent,
            status: Mutex::new(AgentStatus::Idle),
            messages_processed: AtomicU32::new(0),
        }
    }

    /// The agent's identity.
    #[must_use]
    pub fn id(&self) -> &AgentId {
        self.agent.id()
    }

    /// The agent's configuration, by copy, so callers cannot mutate the
    /// registered configuration.
    #[must_use]
    pub fn config(&self) -> AgentConfig {
        self.agent.config().clone()
    }

    /// Current observable status.
    #[must_use]
    pub fn status(&self) -> AgentStatus {
        *self.status.lock()
    }

    /// Forces [`Suspended`](AgentStatus::Suspended) from any state.
    ///
    /// Suspension is advisory: it marks the agent as out of rotation but
    /// does not abort an in-flight body.
    pub fn suspend(&self) {
        *self.status.lock() = AgentStatus::Suspended;
    }

    /// Returns to [`Idle`](AgentStatus::Idle), only from
    /// [`Suspended`](AgentStatus::Suspended).
    ///
    /// Returns whether the transition happened.
    pub fn resume(&self) -> bool {
        let mut status = self.status.lock();
        if *status == AgentStatus::Suspended {
            *status = AgentStatus::Idle;
            true
        } else {
            false
        }
    }

    /// Runs the agent body under the lifecycle contract.
    pub async fn execute(&self, ctx: &Context, input: Value) -> ExecutionResult {
        self.drive(ctx, Call::Run(input)).await
    }

    /// Reacts to an inbound message under the lifecycle contract.
    ///
    /// Synthesizes a [`Context`] from the message (correlation id carried
    /// over) and stamps the per-agent processed-message count into the
    /// result metrics.
    pub async fn handle_message(&self, message: &Message) -> ExecutionResult {
        let processed = self.messages_processed.fetch_add(1, Ordering::Relaxed) + 1;
        let ctx = Context::for_message(self.id().clone(), message);

        let mut result = self.drive(&ctx, Call::Message(message)).await;
        result.metrics.messages_processed = Some(processed);
        result
    }

    fn set_status(&self, status: AgentStatus) {
        *self.status.lock() = status;
    }

    async fn drive(&self, ctx: &Context, call: Call<'_>) -> ExecutionResult {
        self.set_status(AgentStatus::Running);
        let start = Instant::now();

        // If this future is dropped while the body is suspended, the guard
        // still settles the status and runs cleanup.
        let mut guard = CancelGuard {
            handle: self,
            armed: true,
        };

        let body = async {
            match call {
                Call::Run(input) => self.agent.run(ctx, input).await,
                Call::Message(message) => self.agent.on_message(ctx, message).await,
            }
        };
        let outcome = AssertUnwindSafe(body).catch_unwind().await;

        guard.armed = false;
        drop(guard);
        self.agent.cleanup();

        let metrics = ExecutionMetrics::timed(start.elapsed());
        match outcome {
            Ok(Ok(data)) => {
                self.set_status(AgentStatus::Completed);
                ExecutionResult::success(data, metrics)
            }
            Ok(Err(err)) => {
                self.set_status(AgentStatus::Failed);
                warn!(agent = %ctx.agent_id, request = %ctx.request_id, code = err.code(), "agent body failed");
                ExecutionResult::failure(ErrorInfo::from(&err), metrics)
            }
            Err(panic) => {
                self.set_status(AgentStatus::Failed);
                let message = panic_message(panic.as_ref());
                warn!(agent = %ctx.agent_id, request = %ctx.request_id, "agent body panicked: {message}");
                ExecutionResult::failure(
                    ErrorInfo::new("UNKNOWN_ERROR", format!("agent body panicked: {message}")),
                    metrics,
                )
            }
        }
    }
}

struct CancelGuard<'a> {
    handle: &'a AgentHandle,
    armed: bool,
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.handle.set_status(AgentStatus::Failed);
            self.handle.agent.cleanup();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgentError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::AtomicBool;

    struct Probe {
        config: AgentConfig,
        cleaned: Arc<AtomicBool>,
        mode: Mode,
    }

    enum Mode {
        Succeed,
        Fail,
        Panic,
        Hang,
    }

    impl Probe {
        fn new(mode: Mode) -> (Self, Arc<AtomicBool>) {
            let cleaned = Arc::new(AtomicBool::new(false));
            let probe = Self {
                config: AgentConfig::new("probe", "Probe", "test"),
                cleaned: Arc::clone(&cleaned),
                mode,
            };
            (probe, cleaned)
        }
    }

    #[async_trait]
    impl Agent for Probe {
        fn config(&self) -> &AgentConfig {
            &self.config
        }

        async fn run(&self, _ctx: &Context, input: Value) -> Result<Value, AgentError> {
            match self.mode {
                Mode::Succeed => Ok(json!({ "processed": input })),
                Mode::Fail => Err(AgentError::Failed("nope".into())),
                Mode::Panic => panic!("boom"),
                Mode::Hang => {
                    tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                    Ok(Value::Null)
                }
            }
        }

        fn cleanup(&self) {
            self.cleaned.store(true, Ordering::SeqCst);
        }
    }

    fn handle_for(mode: Mode) -> (AgentHandle, Arc<AtomicBool>) {
        let (probe, cleaned) = Probe::new(mode);
        (AgentHandle::new(Arc::new(probe)), cleaned)
    }

    #[tokio::test]
    async fn execute_success_lifecycle() {
        let (handle, cleaned) = handle_for(Mode::Succeed);
        assert_eq!(handle.status(), AgentStatus::Idle);

        let ctx = Context::new(handle.id().clone());
        let result = handle.execute(&ctx, json!({"v": 1})).await;

        assert!(result.success);
        assert_eq!(result.data, Some(json!({"processed": {"v": 1}})));
        assert_eq!(handle.status(), AgentStatus::Completed);
        assert!(cleaned.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn execute_failure_lifecycle() {
        let (handle, cleaned) = handle_for(Mode::Fail);

        let ctx = Context::new(handle.id().clone());
        let result = handle.execute(&ctx, Value::Null).await;

        assert!(!result.success);
        assert_eq!(result.error_code(), Some("AGENT_ERROR"));
        assert_eq!(handle.status(), AgentStatus::Failed);
        assert!(cleaned.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn execute_captures_panics_as_unknown_error() {
        let (handle, cleaned) = handle_for(Mode::Panic);

        let ctx = Context::new(handle.id().clone());
        let result = handle.execute(&ctx, Value::Null).await;

        assert!(!result.success);
        assert_eq!(result.error_code(), Some("UNKNOWN_ERROR"));
        let err = result.error.unwrap();
        assert!(err.message.contains("boom"));
        assert_eq!(handle.status(), AgentStatus::Failed);
        assert!(cleaned.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancellation_still_cleans_up() {
        let (handle, cleaned) = handle_for(Mode::Hang);
        let handle = Arc::new(handle);

        let ctx = Context::new(handle.id().clone());
        let fut = {
            let handle = Arc::clone(&handle);
            tokio::spawn(async move { handle.execute(&ctx, Value::Null).await })
        };

        // Let the body reach its sleep, then cancel.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        fut.abort();
        let _ = fut.await;

        assert!(cleaned.load(Ordering::SeqCst));
        assert_eq!(handle.status(), AgentStatus::Failed);
    }

    #[tokio::test]
    async fn handle_message_counts_and_correlates() {
        let (handle, _) = handle_for(Mode::Succeed);

        let msg = Message::new("sender", "probe", "t", json!(1)).with_correlation_id("X");
        let first = handle.handle_message(&msg).await;
        assert!(first.success);
        assert_eq!(first.metrics.messages_processed, Some(1));

        let second = handle.handle_message(&msg).await;
        assert_eq!(second.metrics.messages_processed, Some(2));
    }

    #[tokio::test]
    async fn suspend_resume_transitions() {
        let (handle, _) = handle_for(Mode::Succeed);

        handle.suspend();
        assert_eq!(handle.status(), AgentStatus::Suspended);

        assert!(handle.resume());
        assert_eq!(handle.status(), AgentStatus::Idle);

        // resume() only leaves Suspended.
        assert!(!handle.resume());
        assert_eq!(handle.status(), AgentStatus::Idle);
    }

    #[tokio::test]
    async fn config_returned_by_copy() {
        let (handle, _) = handle_for(Mode::Succeed);
        let mut copy = handle.config();
        copy.name = "mutated".into();
        assert_eq!(handle.config().name, "Probe");
    }
}
