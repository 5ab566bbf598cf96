use serde::{Deserialize, Serialize};

pub mod budget;
pub mod forecast;
pub mod goal;
pub mod transaction;

pub use budget::{
    AlertState, AlertSweepResponse, AlertType, Budget, BudgetAlert, BudgetAlertsResponse,
    BudgetPeriod, BudgetStatus, BudgetStatusResponse, ThresholdBand,
};
pub use forecast::{
    BudgetDiscipline, BudgetUtilization, CompetingGoalsImpact, ContributionStats,
    FinancialTrends, GoalPrediction, HistoricalContext, MonthlyProjection, NetTrend,
    PredictionFactors, PredictionNarrative, PredictionResponse, PredictionsResponse, Trend,
    Volatility,
};
pub use goal::{GoalContribution, GoalStatus, SavingsGoal};
pub use transaction::{MonthlySummary, Transaction, TransactionType};

/// Error response for API endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Returned when a stored enum value is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_status_serialization() {
        let json = serde_json::to_string(&BudgetStatus::OnTrack).unwrap();
        assert_eq!(json, "\"on_track\"");

        let json = serde_json::to_string(&AlertType::PredictedOverspend).unwrap();
        assert_eq!(json, "\"predicted_overspend\"");
    }

    #[test]
    fn test_trend_serialization() {
        let json = serde_json::to_string(&Trend::NoData).unwrap();
        assert_eq!(json, "\"no_data\"");

        let deserialized: Trend = serde_json::from_str("\"increasing\"").unwrap();
        assert_eq!(deserialized, Trend::Increasing);
    }

    #[test]
    fn test_enum_from_str() {
        assert_eq!("exceeded".parse::<AlertType>().unwrap(), AlertType::Exceeded);
        assert_eq!("monthly".parse::<BudgetPeriod>().unwrap(), BudgetPeriod::Monthly);
        assert_eq!("critical".parse::<ThresholdBand>().unwrap(), ThresholdBand::Critical);

        let err = "sideways".parse::<TransactionType>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown TransactionType value: sideways");
    }

    #[test]
    fn test_threshold_band_ordering() {
        assert!(ThresholdBand::None < ThresholdBand::Approaching);
        assert!(ThresholdBand::Approaching < ThresholdBand::Critical);
        assert!(ThresholdBand::Critical < ThresholdBand::Exceeded);
    }

    #[test]
    fn test_budget_status_defaults_when_missing() {
        let json = r#"{
            "id": 1,
            "user_id": "u1",
            "category": "groceries",
            "amount": 500.0,
            "spent": 120.0,
            "period": "monthly",
            "start_date": "2026-01-01",
            "end_date": null,
            "is_active": true
        }"#;

        let budget: Budget = serde_json::from_str(json).unwrap();
        assert_eq!(budget.status, BudgetStatus::OnTrack);
        assert_eq!(budget.period, BudgetPeriod::Monthly);
    }
}
