pub mod sqlite_storage;

pub use sqlite_storage::SqliteAgentStorage;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "completed" => SessionStatus::Completed,
            "failed" => SessionStatus::Failed,
            _ => SessionStatus::Running,
        }
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<i64>,
    pub agent_type: String,
    pub model: String,
    pub objective: String,
    pub context_data: Option<String>,
    pub status: SessionStatus,
    pub result: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<i64>,
    pub session_id: i64,
    pub role: String,
    pub content: String,
}

/// Persistence for agent runs: one session per run, with its message log
#[async_trait]
pub trait AgentStorage: Send + Sync {
    async fn create_session(&self, session: Session) -> Result<i64>;
    async fn get_session(&self, session_id: i64) -> Result<Option<Session>>;
    async fn finish_session(&self, session_id: i64, status: SessionStatus, result: Option<String>) -> Result<()>;

    async fn create_message(&self, message: Message) -> Result<i64>;
    async fn get_messages(&self, session_id: i64) -> Result<Vec<Message>>;
}
