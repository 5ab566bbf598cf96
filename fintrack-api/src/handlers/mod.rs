pub mod budgets;
pub mod goals;

use actix_web::web;

/// Register the forecasting and alert routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/goals/{id}/predict", web::post().to(goals::predict_goal))
        .route("/api/goals/{id}/prediction", web::get().to(goals::get_latest_prediction))
        .route("/api/goals/{id}/predictions", web::get().to(goals::list_predictions))
        .route("/api/budgets/alerts/sweep", web::post().to(budgets::sweep_alerts))
        .route("/api/budgets/{id}/status", web::get().to(budgets::get_budget_status))
        .route("/api/budgets/{id}/alerts", web::get().to(budgets::list_budget_alerts))
        .route("/api/alerts/{id}/acknowledge", web::post().to(budgets::acknowledge_alert))
        .route("/api/alerts/{id}/dismiss", web::post().to(budgets::dismiss_alert));
}
