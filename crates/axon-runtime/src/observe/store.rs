//! Persistent agent-state observer.
//!
//! A state store watches agent lifecycles for dashboards and audits; the
//! kernel never reads it back for scheduling decisions.

use axon_agent::AgentStatus;
use axon_types::{AgentId, ErrorCode};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// One agent's persisted row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentStateRecord {
    /// Key.
    pub agent_id: AgentId,
    /// Last recorded status.
    pub status: AgentStatus,
    /// Opaque user state blob.
    pub state: Value,
    /// Executions observed so far.
    pub execution_count: u64,
    /// Last write time.
    pub updated_at: DateTime<Utc>,
}

/// Store errors.
///
/// | Variant | Code | Recoverable |
/// |---------|------|-------------|
/// | [`StoreError::NotFound`] | `STORE_NOT_FOUND` | No |
/// | [`StoreError::Backend`] | `STORE_BACKEND` | Yes |
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No row for the given agent id.
    #[error("no state for agent: {0}")]
    NotFound(AgentId),

    /// The backing medium failed.
    #[error("store backend: {0}")]
    Backend(String),
}

impl ErrorCode for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "STORE_NOT_FOUND",
            Self::Backend(_) => "STORE_BACKEND",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

/// Persistence contract, keyed by [`AgentId`].
///
/// Write semantics: `save_agent_state` and `increment_execution_count`
/// upsert; `update_agent_status` requires an existing row;
/// `delete_agent_state` is idempotent.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Upserts the opaque state blob for an agent.
    async fn save_agent_state(&self, agent_id: &AgentId, state: Value) -> Result<(), StoreError>;

    /// Reads an agent's row, if present.
    async fn get_agent_state(
        &self,
        agent_id: &AgentId,
    ) -> Result<Option<AgentStateRecord>, StoreError>;

    /// Records a status change for an existing row.
    async fn update_agent_status(
        &self,
        agent_id: &AgentId,
        status: AgentStatus,
    ) -> Result<(), StoreError>;

    /// Bumps the execution counter, creating the row when absent.
    /// Returns the new count.
    async fn increment_execution_count(&self, agent_id: &AgentId) -> Result<u64, StoreError>;

    /// Reads every row.
    async fn query_all_agents(&self) -> Result<Vec<AgentStateRecord>, StoreError>;

    /// Removes an agent's row. Idempotent.
    async fn delete_agent_state(&self, agent_id: &AgentId) -> Result<(), StoreError>;
}

/// Reference store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    rows: Mutex<HashMap<AgentId, AgentStateRecord>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn blank_row(agent_id: &AgentId) -> AgentStateRecord {
        AgentStateRecord {
            agent_id: agent_id.clone(),
            status: AgentStatus::Idle,
            state: Value::Null,
            execution_count: 0,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn save_agent_state(&self, agent_id: &AgentId, state: Value) -> Result<(), StoreError> {
        let mut rows = self.rows.lock();
        let row = rows
            .entry(agent_id.clone())
            .or_insert_with(|| Self::blank_row(agent_id));
        row.state = state;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn get_agent_state(
        &self,
        agent_id: &AgentId,
    ) -> Result<Option<AgentStateRecord>, StoreError> {
        Ok(self.rows.lock().get(agent_id).cloned())
    }

    async fn update_agent_status(
        &self,
        agent_id: &AgentId,
        status: AgentStatus,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock();
        let row = rows
            .get_mut(agent_id)
            .ok_or_else(|| StoreError::NotFound(agent_id.clone()))?;
        row.status = status;
        row.updated_at = Utc::now();
        Ok(())
    }

    async fn increment_execution_count(&self, agent_id: &AgentId) -> Result<u64, StoreError> {
        let mut rows = self.rows.lock();
        let row = rows
            .entry(agent_id.clone())
            .or_insert_with(|| Self::blank_row(agent_id));
        row.execution_count += 1;
        row.updated_at = Utc::now();
        Ok(row.execution_count)
    }

    async fn query_all_agents(&self) -> Result<Vec<AgentStateRecord>, StoreError> {
        Ok(self.rows.lock().values().cloned().collect())
    }

    async fn delete_agent_state(&self, agent_id: &AgentId) -> Result<(), StoreError> {
        self.rows.lock().remove(agent_id);
        Ok(())
    }
}
