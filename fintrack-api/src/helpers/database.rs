use crate::config::ApiConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Returns the path to the fintrack database
///
/// An explicit `[database] path` in the config wins. Otherwise:
///
/// - **macOS**: `~/Library/Application Support/fintrack/db.sqlite`
/// - **Linux**: `~/.local/share/fintrack/db.sqlite`
/// - **Windows**: `%LOCALAPPDATA%\fintrack\db.sqlite`
pub fn get_db_path(config: &ApiConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = config.database.as_ref().and_then(|db| db.path.as_ref()) {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("fintrack").join("db.sqlite"))
}

/// Open the database, creating and migrating it when needed
pub fn initialize_database(config: &ApiConfig) -> anyhow::Result<Arc<crate::database::Database>> {
    let db_path = get_db_path(config)?;
    let db = crate::database::Database::new(&db_path)?;
    tracing::info!("Database ready at {:?}", db_path);
    Ok(Arc::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    #[test]
    fn test_configured_path_wins() {
        let config = ApiConfig {
            database: Some(DatabaseConfig {
                path: Some("/tmp/fintrack-custom.sqlite".to_string()),
            }),
            ..ApiConfig::default()
        };
        assert_eq!(get_db_path(&config).unwrap(), PathBuf::from("/tmp/fintrack-custom.sqlite"));
    }

    #[test]
    fn test_reopening_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("db.sqlite");
        let config = ApiConfig {
            database: Some(DatabaseConfig {
                path: Some(path.display().to_string()),
            }),
            ..ApiConfig::default()
        };

        {
            let db = initialize_database(&config).unwrap();
            let conn = db.connection.lock().unwrap();
            conn.execute(
                "INSERT INTO transactions (user_id, amount, transaction_type, category, transaction_date, created_at)
                 VALUES ('alice', 10.0, 'income', 'salary', '2026-01-01', 0)",
                [],
            )
            .unwrap();
        }

        let db = initialize_database(&config).unwrap();
        let conn = db.connection.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
