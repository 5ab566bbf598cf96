pub mod budget_alerts;
pub mod budgets;
pub mod contributions;
pub mod goals;
pub mod migrations;
pub mod predictions;
pub mod transactions;

use anyhow::Context;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type DbConnection = Arc<Mutex<Connection>>;

#[derive(Clone)]
pub struct AsyncDbConnection {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl AsyncDbConnection {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn lock(&self) -> anyhow::Result<PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .context("Failed to get DB connection from pool")
    }
}

pub struct Database {
    /// Dedicated connection for agent session storage
    pub connection: DbConnection,
    pub async_connection: AsyncDbConnection,
}

impl Database {
    /// Open (or create) the database at `db_path` and run migrations
    pub fn new(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let sync_conn = Connection::open(db_path)?;
        sync_conn.busy_timeout(Duration::from_secs(5))?;
        sync_conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::run_migrations(&sync_conn)?;

        // Pooled connections are opened after migrations so they see the full schema
        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        let pool = Pool::builder().max_size(8).build(manager)?;

        Ok(Database {
            connection: Arc::new(Mutex::new(sync_conn)),
            async_connection: AsyncDbConnection::new(pool),
        })
    }
}

/// Parse a stored enum column, surfacing bad values as a conversion error.
pub(crate) fn parse_column<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Decode a JSON text column into `T`.
pub(crate) fn json_column<T: serde::de::DeserializeOwned>(
    idx: usize,
    value: String,
) -> rusqlite::Result<T> {
    serde_json::from_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
