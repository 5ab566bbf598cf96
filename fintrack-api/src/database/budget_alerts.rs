use crate::database::{parse_column, AsyncDbConnection};
use anyhow::Result;
use forecasting::AlertEvaluation;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use shared_types::{AlertState, BudgetAlert};

const ALERT_COLUMNS: &str = "id, budget_id, user_id, alert_type, threshold_percentage, current_spent,
     budget_amount, ai_recommendation, triggered_at, acknowledged_at, dismissed_at";

fn alert_from_row(row: &Row) -> rusqlite::Result<BudgetAlert> {
    Ok(BudgetAlert {
        id: row.get(0)?,
        budget_id: row.get(1)?,
        user_id: row.get(2)?,
        alert_type: parse_column(3, row.get(3)?)?,
        threshold_percentage: row.get(4)?,
        current_spent: row.get(5)?,
        budget_amount: row.get(6)?,
        ai_recommendation: row.get(7)?,
        triggered_at: row.get(8)?,
        acknowledged_at: row.get(9)?,
        dismissed_at: row.get(10)?,
    })
}

fn insert_alert(conn: &Connection, alert: &BudgetAlert) -> rusqlite::Result<i64> {
    conn.query_row(
        "INSERT INTO budget_alerts
         (budget_id, user_id, alert_type, threshold_percentage, current_spent, budget_amount,
          ai_recommendation, triggered_at, acknowledged_at, dismissed_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
        params![
            alert.budget_id,
            &alert.user_id,
            alert.alert_type.as_str(),
            alert.threshold_percentage,
            alert.current_spent,
            alert.budget_amount,
            &alert.ai_recommendation,
            alert.triggered_at,
            alert.acknowledged_at,
            alert.dismissed_at,
        ],
        |row| row.get(0),
    )
}

fn upsert_state(conn: &Connection, budget_id: i64, state: &AlertState, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO budget_alert_states
         (budget_id, band, overspend_predicted, achievement_recorded, period_start, updated_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT(budget_id) DO UPDATE SET
            band = excluded.band,
            overspend_predicted = excluded.overspend_predicted,
            achievement_recorded = excluded.achievement_recorded,
            period_start = excluded.period_start,
            updated_at = excluded.updated_at",
        params![
            budget_id,
            state.band.as_str(),
            state.overspend_predicted,
            state.achievement_recorded,
            &state.period_start,
            now,
        ],
    )
}

fn read_state(conn: &Connection, budget_id: i64) -> rusqlite::Result<AlertState> {
    let state = conn
        .query_row(
            "SELECT band, overspend_predicted, achievement_recorded, period_start
             FROM budget_alert_states WHERE budget_id = ?",
            [budget_id],
            |row| {
                Ok(AlertState {
                    band: parse_column(0, row.get(0)?)?,
                    overspend_predicted: row.get(1)?,
                    achievement_recorded: row.get(2)?,
                    period_start: row.get(3)?,
                })
            },
        )
        .optional()?;

    Ok(state.unwrap_or_default())
}

/// Last recorded state for `budget_id`; a budget never evaluated starts from the default
pub async fn get_alert_state(conn: AsyncDbConnection, budget_id: i64) -> Result<AlertState> {
    let conn = conn.lock().await?;
    Ok(read_state(&conn, budget_id)?)
}

/// Read the budget's state, run `evaluate` on it, and store the outcome, all
/// under one write lock so concurrent evaluations of a budget serialize.
///
/// Nothing is written when the state is unchanged and no alert was raised.
/// Returns the alert with its assigned id.
pub async fn record_evaluation<F>(conn: AsyncDbConnection, budget_id: i64, evaluate: F) -> Result<Option<BudgetAlert>>
where
    F: FnOnce(&AlertState) -> AlertEvaluation,
{
    let mut conn = conn.lock().await?;
    let now = chrono::Utc::now().timestamp();

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let previous = read_state(&tx, budget_id)?;
    let evaluation = evaluate(&previous);
    if evaluation.alert.is_none() && evaluation.state == previous {
        return Ok(None);
    }

    let stored = match evaluation.alert {
        Some(alert) => {
            let id = insert_alert(&tx, &alert)?;
            Some(BudgetAlert { id, ..alert })
        }
        None => None,
    };
    upsert_state(&tx, budget_id, &evaluation.state, now)?;

    tx.commit()?;

    Ok(stored)
}

/// Alert `id` if it belongs to `user_id`
pub async fn get_alert(conn: AsyncDbConnection, id: i64, user_id: &str) -> Result<Option<BudgetAlert>> {
    let conn = conn.lock().await?;

    let alert = conn
        .query_row(
            &format!("SELECT {ALERT_COLUMNS} FROM budget_alerts WHERE id = ? AND user_id = ?"),
            params![id, user_id],
            alert_from_row,
        )
        .optional()?;

    Ok(alert)
}

pub async fn update_alert_lifecycle(conn: AsyncDbConnection, alert: &BudgetAlert) -> Result<()> {
    let conn = conn.lock().await?;

    conn.execute(
        "UPDATE budget_alerts SET acknowledged_at = ?, dismissed_at = ? WHERE id = ?",
        params![alert.acknowledged_at, alert.dismissed_at, alert.id],
    )?;

    Ok(())
}

/// Non-dismissed alerts for a budget, newest first
pub async fn list_active_alerts(conn: AsyncDbConnection, budget_id: i64) -> Result<Vec<BudgetAlert>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {ALERT_COLUMNS} FROM budget_alerts
         WHERE budget_id = ? AND dismissed_at IS NULL
         ORDER BY triggered_at DESC, id DESC"
    ))?;

    let alerts = stmt
        .query_map([budget_id], alert_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::budgets::{insert_budget, tests::budget};
    use crate::database::test_support::temp_database;
    use shared_types::{AlertType, ThresholdBand};

    fn alert(budget_id: i64, alert_type: AlertType) -> BudgetAlert {
        BudgetAlert {
            id: 0,
            budget_id,
            user_id: "alice".to_string(),
            alert_type,
            threshold_percentage: 100.0,
            current_spent: 120.0,
            budget_amount: 100.0,
            ai_recommendation: Some("Slow down".to_string()),
            triggered_at: 1_700_000_000,
            acknowledged_at: None,
            dismissed_at: None,
        }
    }

    fn outcome(state: &AlertState, alert: Option<BudgetAlert>) -> AlertEvaluation {
        AlertEvaluation {
            state: state.clone(),
            alert,
        }
    }

    #[tokio::test]
    async fn test_unchanged_state_is_not_written() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let budget_id = insert_budget(conn.clone(), &budget("alice", 100.0, 0.0, true)).await.unwrap();

        let stored = record_evaluation(conn.clone(), budget_id, |previous| outcome(previous, None))
            .await
            .unwrap();
        assert!(stored.is_none());

        let rows: i64 = db
            .connection
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM budget_alert_states", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn test_state_defaults_and_upserts() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let budget_id = insert_budget(conn.clone(), &budget("alice", 100.0, 0.0, true)).await.unwrap();

        assert_eq!(get_alert_state(conn.clone(), budget_id).await.unwrap(), AlertState::default());

        let state = AlertState {
            band: ThresholdBand::Critical,
            overspend_predicted: true,
            achievement_recorded: false,
            period_start: Some("2026-04-01".to_string()),
        };
        record_evaluation(conn.clone(), budget_id, |_| outcome(&state, None)).await.unwrap();
        assert_eq!(get_alert_state(conn.clone(), budget_id).await.unwrap(), state);

        let exceeded = AlertState {
            band: ThresholdBand::Exceeded,
            ..state
        };
        let stored = record_evaluation(conn.clone(), budget_id, |previous| {
            assert_eq!(previous.band, ThresholdBand::Critical);
            outcome(&exceeded, Some(alert(budget_id, AlertType::Exceeded)))
        })
        .await
            .unwrap()
            .unwrap();
        assert!(stored.id > 0);
        assert_eq!(get_alert_state(conn.clone(), budget_id).await.unwrap(), exceeded);
        assert_eq!(list_active_alerts(conn, budget_id).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_failed_alert_insert_rolls_back_state() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let budget_id = insert_budget(conn.clone(), &budget("alice", 100.0, 0.0, true)).await.unwrap();

        // Unknown budget id violates the foreign key, so nothing is written
        let state = AlertState {
            band: ThresholdBand::Exceeded,
            ..AlertState::default()
        };
        let result = record_evaluation(conn.clone(), budget_id, |_| {
            outcome(&state, Some(alert(budget_id + 99, AlertType::Exceeded)))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(get_alert_state(conn, budget_id).await.unwrap(), AlertState::default());
    }

    #[tokio::test]
    async fn test_dismissed_alerts_leave_active_list() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let budget_id = insert_budget(conn.clone(), &budget("alice", 100.0, 0.0, true)).await.unwrap();

        let stored = record_evaluation(conn.clone(), budget_id, |previous| {
            outcome(previous, Some(alert(budget_id, AlertType::Approaching)))
        })
        .await
        .unwrap()
        .unwrap();

        assert!(get_alert(conn.clone(), stored.id, "bob").await.unwrap().is_none());

        let dismissed = BudgetAlert {
            dismissed_at: Some(1_700_000_500),
            ..stored.clone()
        };
        update_alert_lifecycle(conn.clone(), &dismissed).await.unwrap();

        assert!(list_active_alerts(conn.clone(), budget_id).await.unwrap().is_empty());
        let reloaded = get_alert(conn, stored.id, "alice").await.unwrap().unwrap();
        assert_eq!(reloaded.dismissed_at, Some(1_700_000_500));
    }
}
