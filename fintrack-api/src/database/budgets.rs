use crate::database::{parse_column, AsyncDbConnection};
use anyhow::Result;
use forecasting::budget_status::with_derived_status;
use rusqlite::{params, OptionalExtension, Row};
use shared_types::{Budget, BudgetStatus};

const BUDGET_COLUMNS: &str =
    "id, user_id, category, amount, spent, period, start_date, end_date, is_active";

fn budget_from_row(row: &Row) -> rusqlite::Result<Budget> {
    Ok(with_derived_status(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category: row.get(2)?,
        amount: row.get(3)?,
        spent: row.get(4)?,
        period: parse_column(5, row.get(5)?)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        is_active: row.get(8)?,
        status: BudgetStatus::default(),
    }))
}

pub async fn insert_budget(conn: AsyncDbConnection, budget: &Budget) -> Result<i64> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let id: i64 = conn.query_row(
        "INSERT INTO budgets
         (user_id, category, amount, spent, period, start_date, end_date, is_active, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
        params![
            &budget.user_id,
            &budget.category,
            budget.amount,
            budget.spent,
            budget.period.as_str(),
            &budget.start_date,
            &budget.end_date,
            budget.is_active,
            now,
            now,
        ],
        |row| row.get(0),
    )?;

    Ok(id)
}

pub async fn update_budget_spent(conn: AsyncDbConnection, id: i64, spent: f64) -> Result<()> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    conn.execute(
        "UPDATE budgets SET spent = ?, updated_at = ? WHERE id = ?",
        params![spent, now, id],
    )?;

    Ok(())
}

/// Budget `id` if it belongs to `user_id`, with its status derived from spend
pub async fn get_budget(conn: AsyncDbConnection, id: i64, user_id: &str) -> Result<Option<Budget>> {
    let conn = conn.lock().await?;

    let budget = conn
        .query_row(
            &format!("SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = ? AND user_id = ?"),
            params![id, user_id],
            budget_from_row,
        )
        .optional()?;

    Ok(budget)
}

pub async fn list_active_budgets(conn: AsyncDbConnection, user_id: &str) -> Result<Vec<Budget>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {BUDGET_COLUMNS} FROM budgets
         WHERE user_id = ? AND is_active = 1
         ORDER BY id ASC"
    ))?;

    let budgets = stmt
        .query_map(params![user_id], budget_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(budgets)
}

/// Active budgets across every user, for the alert sweep
pub async fn list_all_active_budgets(conn: AsyncDbConnection) -> Result<Vec<Budget>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {BUDGET_COLUMNS} FROM budgets WHERE is_active = 1 ORDER BY id ASC"
    ))?;

    let budgets = stmt
        .query_map([], budget_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(budgets)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::database::test_support::temp_database;
    use shared_types::BudgetPeriod;

    pub(crate) fn budget(user_id: &str, amount: f64, spent: f64, is_active: bool) -> Budget {
        Budget {
            id: 0,
            user_id: user_id.to_string(),
            category: "dining".to_string(),
            amount,
            spent,
            period: BudgetPeriod::Monthly,
            start_date: "2026-04-01".to_string(),
            end_date: None,
            is_active,
            status: BudgetStatus::OnTrack,
        }
    }

    #[tokio::test]
    async fn test_status_is_derived_on_read() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();

        let id = insert_budget(conn.clone(), &budget("alice", 400.0, 100.0, true)).await.unwrap();
        let loaded = get_budget(conn.clone(), id, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.status, BudgetStatus::OnTrack);
        assert_eq!(loaded.period, BudgetPeriod::Monthly);

        update_budget_spent(conn.clone(), id, 380.0).await.unwrap();
        let loaded = get_budget(conn.clone(), id, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.status, BudgetStatus::Critical);

        assert!(get_budget(conn, id, "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_active_listing() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();

        insert_budget(conn.clone(), &budget("alice", 100.0, 0.0, true)).await.unwrap();
        insert_budget(conn.clone(), &budget("alice", 100.0, 0.0, false)).await.unwrap();
        insert_budget(conn.clone(), &budget("bob", 100.0, 0.0, true)).await.unwrap();

        assert_eq!(list_active_budgets(conn.clone(), "alice").await.unwrap().len(), 1);
        assert_eq!(list_all_active_budgets(conn).await.unwrap().len(), 2);
    }
}
