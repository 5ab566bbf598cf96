use crate::database::{parse_column, AsyncDbConnection};
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use shared_types::{GoalStatus, SavingsGoal};

const GOAL_COLUMNS: &str =
    "id, user_id, name, target_amount, current_amount, priority, target_date, status";

fn goal_from_row(row: &Row) -> rusqlite::Result<SavingsGoal> {
    Ok(SavingsGoal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        target_amount: row.get(3)?,
        current_amount: row.get(4)?,
        priority: row.get(5)?,
        target_date: row.get(6)?,
        status: parse_column(7, row.get(7)?)?,
    })
}

pub async fn insert_goal(conn: AsyncDbConnection, goal: &SavingsGoal) -> Result<i64> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let id: i64 = conn.query_row(
        "INSERT INTO savings_goals
         (user_id, name, target_amount, current_amount, priority, target_date, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
        params![
            &goal.user_id,
            &goal.name,
            goal.target_amount,
            goal.current_amount,
            goal.priority,
            &goal.target_date,
            goal.status.as_str(),
            now,
            now,
        ],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// Goal `id` if it belongs to `user_id`
pub async fn get_goal(conn: AsyncDbConnection, id: i64, user_id: &str) -> Result<Option<SavingsGoal>> {
    let conn = conn.lock().await?;

    let goal = conn
        .query_row(
            &format!("SELECT {GOAL_COLUMNS} FROM savings_goals WHERE id = ? AND user_id = ?"),
            params![id, user_id],
            goal_from_row,
        )
        .optional()?;

    Ok(goal)
}

/// The user's active goals other than `exclude_goal_id`
pub async fn list_other_active_goals(
    conn: AsyncDbConnection,
    user_id: &str,
    exclude_goal_id: i64,
) -> Result<Vec<SavingsGoal>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {GOAL_COLUMNS} FROM savings_goals
         WHERE user_id = ? AND status = ? AND id != ?
         ORDER BY priority ASC, id ASC"
    ))?;

    let goals = stmt
        .query_map(
            params![user_id, GoalStatus::Active.as_str(), exclude_goal_id],
            goal_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(goals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::temp_database;

    fn goal(user_id: &str, name: &str, status: GoalStatus) -> SavingsGoal {
        SavingsGoal {
            id: 0,
            user_id: user_id.to_string(),
            name: name.to_string(),
            target_amount: 1000.0,
            current_amount: 100.0,
            priority: 2,
            target_date: Some("2026-12-31".to_string()),
            status,
        }
    }

    #[tokio::test]
    async fn test_goal_ownership_and_competitors() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();

        let main = insert_goal(conn.clone(), &goal("alice", "House", GoalStatus::Active)).await.unwrap();
        insert_goal(conn.clone(), &goal("alice", "Car", GoalStatus::Active)).await.unwrap();
        insert_goal(conn.clone(), &goal("alice", "Boat", GoalStatus::Paused)).await.unwrap();
        insert_goal(conn.clone(), &goal("bob", "Trip", GoalStatus::Active)).await.unwrap();

        let loaded = get_goal(conn.clone(), main, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.name, "House");
        assert_eq!(loaded.status, GoalStatus::Active);
        assert_eq!(loaded.target_date.as_deref(), Some("2026-12-31"));

        assert!(get_goal(conn.clone(), main, "bob").await.unwrap().is_none());

        let others = list_other_active_goals(conn, "alice", main).await.unwrap();
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].name, "Car");
    }
}
