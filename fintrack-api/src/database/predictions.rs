use crate::database::{json_column, AsyncDbConnection};
use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};
use shared_types::GoalPrediction;

const PREDICTION_COLUMNS: &str = "id, goal_id, predicted_completion_date, confidence_score,
     recommended_monthly_amount, minimum_monthly_amount, monthly_projections, ai_insights,
     risk_factors, opportunities, model_version, prediction_factors, created_at";

fn prediction_from_row(row: &Row) -> rusqlite::Result<GoalPrediction> {
    Ok(GoalPrediction {
        id: row.get(0)?,
        goal_id: row.get(1)?,
        predicted_completion_date: row.get(2)?,
        confidence_score: row.get(3)?,
        recommended_monthly_amount: row.get(4)?,
        minimum_monthly_amount: row.get(5)?,
        monthly_projections: json_column(6, row.get(6)?)?,
        ai_insights: json_column(7, row.get(7)?)?,
        risk_factors: json_column(8, row.get(8)?)?,
        opportunities: json_column(9, row.get(9)?)?,
        model_version: row.get(10)?,
        prediction_factors: json_column(11, row.get(11)?)?,
        created_at: row.get(12)?,
    })
}

/// Predictions are append-only; every run is kept for audit.
pub async fn insert_prediction(conn: AsyncDbConnection, prediction: &GoalPrediction) -> Result<i64> {
    let monthly_projections = serde_json::to_string(&prediction.monthly_projections)?;
    let ai_insights = serde_json::to_string(&prediction.ai_insights)?;
    let risk_factors = serde_json::to_string(&prediction.risk_factors)?;
    let opportunities = serde_json::to_string(&prediction.opportunities)?;
    let prediction_factors = serde_json::to_string(&prediction.prediction_factors)?;

    let conn = conn.lock().await?;

    let id: i64 = conn.query_row(
        "INSERT INTO goal_predictions
         (goal_id, predicted_completion_date, confidence_score, recommended_monthly_amount,
          minimum_monthly_amount, monthly_projections, ai_insights, risk_factors, opportunities,
          model_version, prediction_factors, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING id",
        params![
            prediction.goal_id,
            &prediction.predicted_completion_date,
            prediction.confidence_score,
            prediction.recommended_monthly_amount,
            prediction.minimum_monthly_amount,
            monthly_projections,
            ai_insights,
            risk_factors,
            opportunities,
            &prediction.model_version,
            prediction_factors,
            prediction.created_at,
        ],
        |row| row.get(0),
    )?;

    Ok(id)
}

pub async fn get_latest_prediction(conn: AsyncDbConnection, goal_id: i64) -> Result<Option<GoalPrediction>> {
    let conn = conn.lock().await?;

    let prediction = conn
        .query_row(
            &format!(
                "SELECT {PREDICTION_COLUMNS} FROM goal_predictions
                 WHERE goal_id = ?
                 ORDER BY created_at DESC, id DESC
                 LIMIT 1"
            ),
            [goal_id],
            prediction_from_row,
        )
        .optional()?;

    Ok(prediction)
}

/// Every stored prediction for a goal, newest first
pub async fn list_predictions(conn: AsyncDbConnection, goal_id: i64) -> Result<Vec<GoalPrediction>> {
    let conn = conn.lock().await?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {PREDICTION_COLUMNS} FROM goal_predictions
         WHERE goal_id = ?
         ORDER BY created_at DESC, id DESC"
    ))?;

    let predictions = stmt
        .query_map([goal_id], prediction_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(predictions)
}
