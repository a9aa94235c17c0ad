//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

/// Tuning for an [`Orchestrator`](crate::Orchestrator).
///
/// # Example
///
/// ```
/// use axon_runtime::OrchestratorConfig;
///
/// let config = OrchestratorConfig::default();
/// assert!(config.fallback_enabled);
/// assert_eq!(config.max_concurrent_agents, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Whether exhausted primaries may fall back to their configured
    /// fallback agent.
    pub fallback_enabled: bool,

    /// Global admission cap: executions simultaneously in the running
    /// region.
    pub max_concurrent_agents: usize,

    /// Timeout hint applied when an agent's configuration carries none,
    /// in milliseconds. Enforcement belongs to the resilience layer and
    /// the transport, not the base execution contract.
    pub default_timeout_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            max_concurrent_agents: 10,
            default_timeout_ms: 30_000,
        }
    }
}

impl OrchestratorConfig {
    /// Sets the admission cap.
    #[must_use]
    pub fn with_max_concurrent_agents(mut self, cap: usize) -> Self {
        self.max_concurrent_agents = cap;
        self
    }

    /// Enables or disables fallback execution.
    #[must_use]
    pub fn with_fallback_enabled(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    /// Sets the default timeout hint.
    #[must_use]
    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }
}
