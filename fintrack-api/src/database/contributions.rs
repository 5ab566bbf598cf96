use crate::database::AsyncDbConnection;
use anyhow::Result;
use rusqlite::params;
use shared_types::GoalContribution;

pub async fn insert_contribution(conn: AsyncDbConnection, contribution: &GoalContribution) -> Result<i64> {
    let conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let id: i64 = conn.query_row(
        "INSERT INTO goal_contributions (goal_id, amount, contribution_date, created_at)
         VALUES (?, ?, ?, ?)
         RETURNING id",
        params![
            contribution.goal_id,
            contribution.amount,
            &contribution.contribution_date,
            now,
        ],
        |row| row.get(0),
    )?;

    Ok(id)
}

/// Contributions to `goal_id` dated within `[since, until]` (inclusive, `YYYY-MM-DD`)
pub async fn list_contributions_between(
    conn: AsyncDbConnection,
    goal_id: i64,
    since: &str,
    until: &str,
) -> Result<Vec<GoalContribution>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(
        "SELECT id, goal_id, amount, contribution_date
         FROM goal_contributions
         WHERE goal_id = ? AND substr(contribution_date, 1, 10) BETWEEN ? AND ?
         ORDER BY contribution_date ASC",
    )?;

    let contributions = stmt
        .query_map(params![goal_id, since, until], |row| {
            Ok(GoalContribution {
                id: row.get(0)?,
                goal_id: row.get(1)?,
                amount: row.get(2)?,
                contribution_date: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(contributions)
}
