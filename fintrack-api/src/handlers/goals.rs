use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared_types::PredictionsResponse;
use std::sync::Arc;
use tracing::info;

use crate::error::ServiceError;
use crate::helpers::time::resolve_now;
use crate::jobs::prediction_manager::PredictionManager;

#[derive(Deserialize)]
pub struct GoalQuery {
    user_id: String,
    as_of: Option<String>,
}

pub async fn predict_goal(
    manager: web::Data<Arc<PredictionManager>>,
    path: web::Path<i64>,
    query: web::Query<GoalQuery>,
) -> Result<HttpResponse, ServiceError> {
    let goal_id = path.into_inner();
    let now = resolve_now(query.as_of.as_deref())?;

    info!("Predicting goal {} for user {}", goal_id, query.user_id);
    let response = manager.predict_goal(goal_id, &query.user_id, now).await?;

    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_latest_prediction(
    manager: web::Data<Arc<PredictionManager>>,
    path: web::Path<i64>,
    query: web::Query<GoalQuery>,
) -> Result<HttpResponse, ServiceError> {
    let prediction = manager.latest_prediction(path.into_inner(), &query.user_id).await?;
    Ok(HttpResponse::Ok().json(prediction))
}

pub async fn list_predictions(
    manager: web::Data<Arc<PredictionManager>>,
    path: web::Path<i64>,
    query: web::Query<GoalQuery>,
) -> Result<HttpResponse, ServiceError> {
    let predictions = manager.list_predictions(path.into_inner(), &query.user_id).await?;
    Ok(HttpResponse::Ok().json(PredictionsResponse { predictions }))
}
