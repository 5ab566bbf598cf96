use super::{AgentStorage, Message, Session, SessionStatus};
use anyhow::anyhow;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

pub const AGENT_TABLES_SQL: &str = "
    CREATE TABLE IF NOT EXISTS agent_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        agent_name TEXT NOT NULL,
        provider TEXT NOT NULL,
        model TEXT NOT NULL,
        user_prompt TEXT NOT NULL,
        config TEXT,
        status TEXT NOT NULL,
        result TEXT,
        started_at INTEGER NOT NULL,
        ended_at INTEGER
    );

    CREATE TABLE IF NOT EXISTS agent_messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id INTEGER NOT NULL REFERENCES agent_sessions(id),
        role TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_agent_messages_session ON agent_messages(session_id);
";

pub struct SqliteAgentStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAgentStorage {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Agent storage connection mutex poisoned"))
    }
}

#[async_trait]
impl AgentStorage for SqliteAgentStorage {
    async fn create_session(&self, session: Session) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO agent_sessions
             (agent_name, provider, model, user_prompt, config, status, started_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                session.agent_type,
                "anthropic",
                session.model,
                session.objective,
                session.context_data,
                session.status.as_str(),
                now,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn get_session(&self, session_id: i64) -> anyhow::Result<Option<Session>> {
        let conn = self.lock()?;

        let session = conn
            .query_row(
                "SELECT id, agent_name, model, user_prompt, config, status, result
                 FROM agent_sessions WHERE id = ?",
                [session_id],
                |row| {
                    Ok(Session {
                        id: Some(row.get(0)?),
                        agent_type: row.get(1)?,
                        model: row.get(2)?,
                        objective: row.get(3)?,
                        context_data: row.get(4)?,
                        status: SessionStatus::parse(&row.get::<_, String>(5)?),
                        result: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(session)
    }

    async fn finish_session(
        &self,
        session_id: i64,
        status: SessionStatus,
        result: Option<String>,
    ) -> anyhow::Result<()> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "UPDATE agent_sessions
             SET status = ?, result = ?, ended_at = ?
             WHERE id = ?",
            rusqlite::params![
                status.as_str(),
                result,
                status.is_finished().then_some(now),
                session_id,
            ],
        )?;

        Ok(())
    }

    async fn create_message(&self, message: Message) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO agent_messages (session_id, role, content, created_at)
             VALUES (?, ?, ?, ?)",
            rusqlite::params![message.session_id, message.role, message.content, now],
        )?;

        Ok(conn.last_insert_rowid())
    }

    async fn get_messages(&self, session_id: i64) -> anyhow::Result<Vec<Message>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content
             FROM agent_messages
             WHERE session_id = ?
             ORDER BY created_at ASC, id ASC",
        )?;

        let messages = stmt
            .query_map([session_id], |row| {
                Ok(Message {
                    id: Some(row.get(0)?),
                    session_id: row.get(1)?,
                    role: row.get(2)?,
                    content: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }
}
