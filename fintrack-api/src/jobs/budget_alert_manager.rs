use crate::database::{budget_alerts as alerts_db, budgets as budgets_db, AsyncDbConnection};
use crate::error::ServiceError;
use chrono::{DateTime, Utc};
use forecasting::{alert_engine, evaluate_budget_status};
use shared_types::{AlertSweepResponse, Budget, BudgetAlert, BudgetStatusResponse};

pub struct BudgetAlertManager {
    db_conn: AsyncDbConnection,
}

impl BudgetAlertManager {
    pub fn new(db_conn: AsyncDbConnection) -> Self {
        Self { db_conn }
    }

    /// Current status of a budget, raising an alert if a threshold was crossed
    /// since the last evaluation.
    pub async fn evaluate_budget(
        &self,
        budget_id: i64,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BudgetStatusResponse, ServiceError> {
        let budget = self.load_budget(budget_id, user_id).await?;
        let report = evaluate_budget_status(&budget, now.date_naive());

        let (new_alert, warning) = match self.evaluate_and_record(&budget, now).await {
            Ok(outcome) => (outcome.alert, None),
            Err(failure) => {
                tracing::error!("Failed to record alert state for budget {}: {}", budget.id, failure.error);
                (
                    failure.computed_alert,
                    Some(format!("Alert state could not be saved: {}", failure.error)),
                )
            }
        };

        Ok(BudgetStatusResponse {
            status: report.status,
            percentage_spent: report.percentage_spent,
            days_remaining: report.days_remaining,
            budget,
            new_alert,
            warning,
        })
    }

    pub async fn list_active_alerts(&self, budget_id: i64, user_id: &str) -> Result<Vec<BudgetAlert>, ServiceError> {
        self.load_budget(budget_id, user_id).await?;
        Ok(alerts_db::list_active_alerts(self.db_conn.clone(), budget_id).await?)
    }

    pub async fn acknowledge_alert(
        &self,
        alert_id: i64,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BudgetAlert, ServiceError> {
        let alert = self.load_alert(alert_id, user_id).await?;
        let acknowledged = alert_engine::acknowledge(&alert, now.timestamp())?;

        if acknowledged != alert {
            alerts_db::update_alert_lifecycle(self.db_conn.clone(), &acknowledged).await?;
        }

        Ok(acknowledged)
    }

    pub async fn dismiss_alert(
        &self,
        alert_id: i64,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<BudgetAlert, ServiceError> {
        let alert = self.load_alert(alert_id, user_id).await?;
        let dismissed = alert_engine::dismiss(&alert, now.timestamp())?;
        alerts_db::update_alert_lifecycle(self.db_conn.clone(), &dismissed).await?;

        tracing::info!("Dismissed alert {} on budget {}", dismissed.id, dismissed.budget_id);
        Ok(dismissed)
    }

    /// Evaluate every active budget concurrently. A failing budget is counted and
    /// skipped; it never aborts the sweep.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<AlertSweepResponse, ServiceError> {
        let budgets = budgets_db::list_all_active_budgets(self.db_conn.clone()).await?;

        let outcomes =
            futures::future::join_all(budgets.iter().map(|budget| self.evaluate_and_record(budget, now)))
                .await;

        let mut response = AlertSweepResponse {
            evaluated: budgets.len(),
            alerts_triggered: 0,
            failures: 0,
        };

        for (budget, outcome) in budgets.iter().zip(outcomes) {
            match outcome {
                Ok(outcome) if outcome.alert.is_some() => response.alerts_triggered += 1,
                Ok(_) => {}
                Err(failure) => {
                    tracing::warn!("Alert sweep failed for budget {}: {}", budget.id, failure.error);
                    response.failures += 1;
                }
            }
        }

        tracing::info!(
            "Alert sweep evaluated {} budgets, {} alerts, {} failures",
            response.evaluated,
            response.alerts_triggered,
            response.failures
        );

        Ok(response)
    }

    async fn evaluate_and_record(
        &self,
        budget: &Budget,
        now: DateTime<Utc>,
    ) -> Result<RecordedEvaluation, RecordFailure> {
        let mut computed_alert = None;

        let recorded = alerts_db::record_evaluation(self.db_conn.clone(), budget.id, |previous| {
            let evaluation = alert_engine::evaluate(budget, previous, now);
            computed_alert = evaluation.alert.clone();
            evaluation
        })
        .await;

        match recorded {
            Ok(alert) => Ok(RecordedEvaluation { alert }),
            Err(error) => Err(RecordFailure {
                error,
                computed_alert,
            }),
        }
    }

    async fn load_budget(&self, budget_id: i64, user_id: &str) -> Result<Budget, ServiceError> {
        budgets_db::get_budget(self.db_conn.clone(), budget_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Budget {} not found", budget_id)))
    }

    async fn load_alert(&self, alert_id: i64, user_id: &str) -> Result<BudgetAlert, ServiceError> {
        alerts_db::get_alert(self.db_conn.clone(), alert_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Alert {} not found", alert_id)))
    }
}

struct RecordedEvaluation {
    alert: Option<BudgetAlert>,
}

/// A write that failed, carrying the alert that was computed but not stored
struct RecordFailure {
    error: anyhow::Error,
    computed_alert: Option<BudgetAlert>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::budgets::{insert_budget, tests::budget, update_budget_spent};
    use crate::database::test_support::temp_database;
    use chrono::TimeZone;
    use shared_types::{AlertType, BudgetStatus};
    use std::sync::Arc;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, day, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_threshold_alerts_fire_once() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let manager = BudgetAlertManager::new(conn.clone());
        // 420 of 400 spent by day 28
        let budget_id = insert_budget(conn.clone(), &budget("alice", 400.0, 420.0, true)).await.unwrap();

        let first = manager.evaluate_budget(budget_id, "alice", at(28)).await.unwrap();
        assert_eq!(first.status, BudgetStatus::Exceeded);
        assert_eq!(first.percentage_spent, 105.0);
        assert_eq!(first.days_remaining, Some(2));
        let alert = first.new_alert.unwrap();
        assert_eq!(alert.alert_type, AlertType::Exceeded);
        assert!(alert.id > 0);

        let second = manager.evaluate_budget(budget_id, "alice", at(28)).await.unwrap();
        assert!(second.new_alert.is_none());

        let active = manager.list_active_alerts(budget_id, "alice").await.unwrap();
        assert_eq!(active, vec![alert]);
    }

    #[tokio::test]
    async fn test_dismiss_then_recross_after_drop() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let manager = BudgetAlertManager::new(conn.clone());
        let budget_id = insert_budget(conn.clone(), &budget("alice", 400.0, 420.0, true)).await.unwrap();

        let alert = manager.evaluate_budget(budget_id, "alice", at(28)).await.unwrap().new_alert.unwrap();

        let acknowledged = manager.acknowledge_alert(alert.id, "alice", at(28)).await.unwrap();
        assert!(acknowledged.acknowledged_at.is_some());
        assert_eq!(manager.list_active_alerts(budget_id, "alice").await.unwrap().len(), 1);

        manager.dismiss_alert(alert.id, "alice", at(28)).await.unwrap();
        assert!(manager.list_active_alerts(budget_id, "alice").await.unwrap().is_empty());
        assert!(matches!(
            manager.dismiss_alert(alert.id, "alice", at(28)).await,
            Err(ServiceError::Conflict(_))
        ));
        assert!(matches!(
            manager.acknowledge_alert(alert.id, "alice", at(28)).await,
            Err(ServiceError::Conflict(_))
        ));

        // Still over budget: dismissal does not re-arm
        assert!(manager.evaluate_budget(budget_id, "alice", at(29)).await.unwrap().new_alert.is_none());

        // A refund drops spend back under, then spend crosses again
        update_budget_spent(conn.clone(), budget_id, 100.0).await.unwrap();
        assert!(manager.evaluate_budget(budget_id, "alice", at(29)).await.unwrap().new_alert.is_none());
        update_budget_spent(conn.clone(), budget_id, 410.0).await.unwrap();
        let again = manager.evaluate_budget(budget_id, "alice", at(30)).await.unwrap();
        assert_eq!(again.new_alert.unwrap().alert_type, AlertType::Exceeded);
    }

    #[tokio::test]
    async fn test_ownership_checks() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let manager = BudgetAlertManager::new(conn.clone());
        let budget_id = insert_budget(conn.clone(), &budget("alice", 400.0, 420.0, true)).await.unwrap();
        let alert = manager.evaluate_budget(budget_id, "alice", at(28)).await.unwrap().new_alert.unwrap();

        assert!(matches!(
            manager.evaluate_budget(budget_id, "bob", at(28)).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            manager.list_active_alerts(budget_id, "bob").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            manager.dismiss_alert(alert.id, "bob", at(28)).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_evaluations_raise_one_alert() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let manager = Arc::new(BudgetAlertManager::new(conn.clone()));

        for _ in 0..20 {
            let budget_id = insert_budget(conn.clone(), &budget("alice", 400.0, 420.0, true)).await.unwrap();
            let barrier = Arc::new(tokio::sync::Barrier::new(4));

            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let manager = manager.clone();
                    let barrier = barrier.clone();
                    tokio::spawn(async move {
                        barrier.wait().await;
                        manager.evaluate_budget(budget_id, "alice", at(28)).await
                    })
                })
                .collect();

            let mut raised = 0;
            for handle in handles {
                let status = handle.await.unwrap().unwrap();
                assert!(status.warning.is_none());
                if status.new_alert.is_some() {
                    raised += 1;
                }
            }

            assert_eq!(raised, 1, "budget {}", budget_id);
            assert_eq!(manager.list_active_alerts(budget_id, "alice").await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_sweep_counts_new_alerts() {
        let (_dir, db) = temp_database();
        let conn = db.async_connection.clone();
        let manager = BudgetAlertManager::new(conn.clone());

        // Late in the month so low spend does not project an overspend
        insert_budget(conn.clone(), &budget("alice", 400.0, 300.0, true)).await.unwrap();
        insert_budget(conn.clone(), &budget("alice", 400.0, 50.0, true)).await.unwrap();
        insert_budget(conn.clone(), &budget("bob", 100.0, 100.0, true)).await.unwrap();
        insert_budget(conn.clone(), &budget("bob", 100.0, 500.0, false)).await.unwrap();

        let first = manager.sweep(at(28)).await.unwrap();
        assert_eq!(first.evaluated, 3);
        assert_eq!(first.alerts_triggered, 2);
        assert_eq!(first.failures, 0);

        let second = manager.sweep(at(28)).await.unwrap();
        assert_eq!(second.evaluated, 3);
        assert_eq!(second.alerts_triggered, 0);
    }
}
