use crate::database::{
    budgets as budgets_db, contributions as contributions_db, goals as goals_db,
    predictions as predictions_db, transactions as transactions_db, AsyncDbConnection,
};
use crate::error::ServiceError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use fintrack_agents::GoalNarrativeAgent;
use forecasting::financial_trends::lookback_start;
use forecasting::historical_context::MAX_SUMMARY_MONTHS;
use forecasting::{build_prediction_factors, ForecastInputs, GoalCompletionPredictor};
use shared_types::{GoalPrediction, PredictionResponse, SavingsGoal};
use std::sync::Arc;

/// Contribution history considered for velocity and consistency
const CONTRIBUTION_LOOKBACK_DAYS: i64 = 365;

pub struct PredictionManager {
    db_conn: AsyncDbConnection,
    predictor: GoalCompletionPredictor,
    narrator: Option<Arc<GoalNarrativeAgent>>,
}

impl PredictionManager {
    pub fn new(
        db_conn: AsyncDbConnection,
        predictor: GoalCompletionPredictor,
        narrator: Option<Arc<GoalNarrativeAgent>>,
    ) -> Self {
        Self {
            db_conn,
            predictor,
            narrator,
        }
    }

    /// Forecast `goal_id` as of `now`, persist it, and return it.
    ///
    /// A failed narrative leaves the narrative lists empty; a failed insert is
    /// reported through `persisted` and `warning` instead of an error.
    pub async fn predict_goal(
        &self,
        goal_id: i64,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PredictionResponse, ServiceError> {
        let goal = self.load_goal(goal_id, user_id).await?;
        let today = now.date_naive();

        let until = format_date(today);
        let transactions_since = format_date(lookback_start(today));
        let contributions_since = format_date(today - Duration::days(CONTRIBUTION_LOOKBACK_DAYS));

        let (contributions, transactions, monthly_summaries, competing_goals, budgets) = tokio::try_join!(
            contributions_db::list_contributions_between(
                self.db_conn.clone(),
                goal.id,
                &contributions_since,
                &until,
            ),
            transactions_db::list_transactions_between(
                self.db_conn.clone(),
                user_id,
                &transactions_since,
                &until,
            ),
            transactions_db::list_monthly_summaries(
                self.db_conn.clone(),
                user_id,
                &until,
                MAX_SUMMARY_MONTHS,
            ),
            goals_db::list_other_active_goals(self.db_conn.clone(), user_id, goal.id),
            budgets_db::list_active_budgets(self.db_conn.clone(), user_id),
        )?;

        tracing::debug!(
            "Goal {} inputs: {} contributions, {} transactions, {} months, {} competing goals, {} budgets",
            goal.id,
            contributions.len(),
            transactions.len(),
            monthly_summaries.len(),
            competing_goals.len(),
            budgets.len()
        );

        let inputs = ForecastInputs {
            contributions: &contributions,
            transactions: &transactions,
            monthly_summaries: &monthly_summaries,
            competing_goals: &competing_goals,
            budgets: &budgets,
        };
        let factors = build_prediction_factors(&inputs, today);

        let preview = self.predictor.predict(&goal, factors.clone(), None, now);
        let narrative = self.narrate(&goal, &preview).await;
        let mut prediction = self.predictor.predict(&goal, factors, narrative, now);

        let (persisted, warning) =
            match predictions_db::insert_prediction(self.db_conn.clone(), &prediction).await {
                Ok(id) => {
                    prediction.id = id;
                    (true, None)
                }
                Err(e) => {
                    tracing::error!("Failed to persist prediction for goal {}: {}", goal.id, e);
                    (false, Some(format!("Prediction was computed but not saved: {}", e)))
                }
            };

        tracing::info!(
            "Predicted goal {} completion on {} (confidence {:.2})",
            goal.id,
            prediction.predicted_completion_date,
            prediction.confidence_score
        );

        Ok(PredictionResponse {
            prediction,
            persisted,
            warning,
        })
    }

    pub async fn latest_prediction(&self, goal_id: i64, user_id: &str) -> Result<GoalPrediction, ServiceError> {
        self.load_goal(goal_id, user_id).await?;

        predictions_db::get_latest_prediction(self.db_conn.clone(), goal_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No prediction for goal {}", goal_id)))
    }

    pub async fn list_predictions(&self, goal_id: i64, user_id: &str) -> Result<Vec<GoalPrediction>, ServiceError> {
        self.load_goal(goal_id, user_id).await?;
        Ok(predictions_db::list_predictions(self.db_conn.clone(), goal_id).await?)
    }

    async fn load_goal(&self, goal_id: i64, user_id: &str) -> Result<SavingsGoal, ServiceError> {
        goals_db::get_goal(self.db_conn.clone(), goal_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Goal {} not found", goal_id)))
    }

    async fn narrate(
        &self,
        goal: &SavingsGoal,
        preview: &GoalPrediction,
    ) -> Option<shared_types::PredictionNarrative> {
        let narrator = self.narrator.as_ref()?;

        match narrator.narrate(goal, preview).await {
            Ok(narrative) => Some(narrative),
            Err(e) => {
                tracing::warn!("Narrative for goal {} unavailable: {}", goal.id, e);
                None
            }
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
