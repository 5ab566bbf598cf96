use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(fintrack_agents::storage::sqlite_storage::AGENT_TABLES_SQL)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS savings_goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL,
            current_amount REAL NOT NULL DEFAULT 0,
            priority INTEGER NOT NULL DEFAULT 3 CHECK (priority BETWEEN 1 AND 5),
            target_date TEXT,
            status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'completed', 'paused', 'cancelled')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS goal_contributions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            goal_id INTEGER NOT NULL,
            amount REAL NOT NULL,
            contribution_date TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (goal_id) REFERENCES savings_goals (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            amount REAL NOT NULL,
            transaction_type TEXT NOT NULL CHECK (transaction_type IN ('income', 'expense')),
            category TEXT NOT NULL,
            transaction_date TEXT NOT NULL,
            description TEXT,
            created_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS budgets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            category TEXT NOT NULL,
            amount REAL NOT NULL,
            spent REAL NOT NULL DEFAULT 0,
            period TEXT NOT NULL CHECK (period IN ('weekly', 'monthly', 'quarterly', 'yearly', 'custom')),
            start_date TEXT NOT NULL,
            end_date TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS budget_alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            budget_id INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            alert_type TEXT NOT NULL CHECK (alert_type IN ('approaching', 'exceeded', 'predicted_overspend', 'achievement')),
            threshold_percentage REAL NOT NULL,
            current_spent REAL NOT NULL,
            budget_amount REAL NOT NULL,
            ai_recommendation TEXT,
            triggered_at INTEGER NOT NULL,
            acknowledged_at INTEGER,
            dismissed_at INTEGER,
            FOREIGN KEY (budget_id) REFERENCES budgets (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS budget_alert_states (
            budget_id INTEGER PRIMARY KEY,
            band TEXT NOT NULL DEFAULT 'none' CHECK (band IN ('none', 'approaching', 'critical', 'exceeded')),
            overspend_predicted INTEGER NOT NULL DEFAULT 0,
            achievement_recorded INTEGER NOT NULL DEFAULT 0,
            period_start TEXT,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (budget_id) REFERENCES budgets (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS goal_predictions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            goal_id INTEGER NOT NULL,
            predicted_completion_date TEXT NOT NULL,
            confidence_score REAL NOT NULL,
            recommended_monthly_amount REAL NOT NULL,
            minimum_monthly_amount REAL NOT NULL,
            monthly_projections TEXT NOT NULL,
            ai_insights TEXT NOT NULL,
            risk_factors TEXT NOT NULL,
            opportunities TEXT NOT NULL,
            model_version TEXT NOT NULL,
            prediction_factors TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (goal_id) REFERENCES savings_goals (id) ON DELETE CASCADE
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_savings_goals_user ON savings_goals(user_id, status)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_contributions_goal_date
            ON goal_contributions(goal_id, contribution_date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_user_date
            ON transactions(user_id, transaction_date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_budgets_user_active ON budgets(user_id, is_active)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_budget_alerts_budget ON budget_alerts(budget_id, dismissed_at)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_predictions_goal
            ON goal_predictions(goal_id, created_at)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        for table in [
            "agent_messages",
            "agent_sessions",
            "budget_alert_states",
            "budget_alerts",
            "budgets",
            "goal_contributions",
            "goal_predictions",
            "savings_goals",
            "transactions",
        ] {
            assert!(tables.iter().any(|t| t == table), "missing table {}", table);
        }
    }
}
