pub mod budget_alert_manager;
pub mod prediction_manager;
