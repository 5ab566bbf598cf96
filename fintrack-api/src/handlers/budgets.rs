use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared_types::BudgetAlertsResponse;
use std::sync::Arc;
use tracing::info;

use crate::error::ServiceError;
use crate::helpers::time::resolve_now;
use crate::jobs::budget_alert_manager::BudgetAlertManager;

#[derive(Deserialize)]
pub struct BudgetQuery {
    user_id: String,
    as_of: Option<String>,
}

#[derive(Deserialize)]
pub struct SweepQuery {
    as_of: Option<String>,
}

pub async fn get_budget_status(
    manager: web::Data<Arc<BudgetAlertManager>>,
    path: web::Path<i64>,
    query: web::Query<BudgetQuery>,
) -> Result<HttpResponse, ServiceError> {
    let now = resolve_now(query.as_of.as_deref())?;
    let status = manager.evaluate_budget(path.into_inner(), &query.user_id, now).await?;
    Ok(HttpResponse::Ok().json(status))
}

pub async fn list_budget_alerts(
    manager: web::Data<Arc<BudgetAlertManager>>,
    path: web::Path<i64>,
    query: web::Query<BudgetQuery>,
) -> Result<HttpResponse, ServiceError> {
    let alerts = manager.list_active_alerts(path.into_inner(), &query.user_id).await?;
    Ok(HttpResponse::Ok().json(BudgetAlertsResponse { alerts }))
}

pub async fn acknowledge_alert(
    manager: web::Data<Arc<BudgetAlertManager>>,
    path: web::Path<i64>,
    query: web::Query<BudgetQuery>,
) -> Result<HttpResponse, ServiceError> {
    let now = resolve_now(query.as_of.as_deref())?;
    let alert = manager.acknowledge_alert(path.into_inner(), &query.user_id, now).await?;
    Ok(HttpResponse::Ok().json(alert))
}

pub async fn dismiss_alert(
    manager: web::Data<Arc<BudgetAlertManager>>,
    path: web::Path<i64>,
    query: web::Query<BudgetQuery>,
) -> Result<HttpResponse, ServiceError> {
    let now = resolve_now(query.as_of.as_deref())?;
    let alert = manager.dismiss_alert(path.into_inner(), &query.user_id, now).await?;
    Ok(HttpResponse::Ok().json(alert))
}

pub async fn sweep_alerts(
    manager: web::Data<Arc<BudgetAlertManager>>,
    query: web::Query<SweepQuery>,
) -> Result<HttpResponse, ServiceError> {
    let now = resolve_now(query.as_of.as_deref())?;
    info!("Running budget alert sweep as of {}", now.date_naive());

    let summary = manager.sweep(now).await?;
    Ok(HttpResponse::Ok().json(summary))
}
