use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ParseEnumError;

/// Length of a budget period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    Custom,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &str {
        match self {
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Quarterly => "quarterly",
            BudgetPeriod::Yearly => "yearly",
            BudgetPeriod::Custom => "custom",
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(BudgetPeriod::Weekly),
            "monthly" => Ok(BudgetPeriod::Monthly),
            "quarterly" => Ok(BudgetPeriod::Quarterly),
            "yearly" => Ok(BudgetPeriod::Yearly),
            "custom" => Ok(BudgetPeriod::Custom),
            other => Err(ParseEnumError::new("BudgetPeriod", other)),
        }
    }
}

/// Derived spend status of a budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    #[default]
    OnTrack,
    Warning,
    Critical,
    Exceeded,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BudgetStatus::OnTrack => "on_track",
            BudgetStatus::Warning => "warning",
            BudgetStatus::Critical => "critical",
            BudgetStatus::Exceeded => "exceeded",
        }
    }
}

/// Spending budget for one category.
///
/// `status` is never stored; readers recompute it from `spent / amount`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Budget {
    pub id: i64,
    pub user_id: String,
    pub category: String,
    pub amount: f64,
    pub spent: f64,
    pub period: BudgetPeriod,
    /// `YYYY-MM-DD`
    pub start_date: String,
    pub end_date: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Approaching,
    Exceeded,
    PredictedOverspend,
    Achievement,
}

impl AlertType {
    pub fn as_str(&self) -> &str {
        match self {
            AlertType::Approaching => "approaching",
            AlertType::Exceeded => "exceeded",
            AlertType::PredictedOverspend => "predicted_overspend",
            AlertType::Achievement => "achievement",
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approaching" => Ok(AlertType::Approaching),
            "exceeded" => Ok(AlertType::Exceeded),
            "predicted_overspend" => Ok(AlertType::PredictedOverspend),
            "achievement" => Ok(AlertType::Achievement),
            other => Err(ParseEnumError::new("AlertType", other)),
        }
    }
}

/// Alert raised when a budget crosses a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BudgetAlert {
    pub id: i64,
    pub budget_id: i64,
    pub user_id: String,
    pub alert_type: AlertType,
    pub threshold_percentage: f64,
    pub current_spent: f64,
    pub budget_amount: f64,
    pub ai_recommendation: Option<String>,
    pub triggered_at: i64,
    pub acknowledged_at: Option<i64>,
    pub dismissed_at: Option<i64>,
}

impl BudgetAlert {
    pub fn is_active(&self) -> bool {
        self.dismissed_at.is_none()
    }
}

/// Ordered utilization band a budget can occupy
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdBand {
    #[default]
    None,
    Approaching,
    Critical,
    Exceeded,
}

impl ThresholdBand {
    pub fn as_str(&self) -> &str {
        match self {
            ThresholdBand::None => "none",
            ThresholdBand::Approaching => "approaching",
            ThresholdBand::Critical => "critical",
            ThresholdBand::Exceeded => "exceeded",
        }
    }
}

impl std::str::FromStr for ThresholdBand {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(ThresholdBand::None),
            "approaching" => Ok(ThresholdBand::Approaching),
            "critical" => Ok(ThresholdBand::Critical),
            "exceeded" => Ok(ThresholdBand::Exceeded),
            other => Err(ParseEnumError::new("ThresholdBand", other)),
        }
    }
}

/// Last evaluated alert state of a single budget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AlertState {
    pub band: ThresholdBand,
    pub overspend_predicted: bool,
    pub achievement_recorded: bool,
    /// Period the state belongs to; a new period starts from a clean state
    pub period_start: Option<String>,
}

/// Response for the budget status endpoint
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BudgetStatusResponse {
    pub budget: Budget,
    pub status: BudgetStatus,
    pub percentage_spent: f64,
    pub days_remaining: Option<i64>,
    pub new_alert: Option<BudgetAlert>,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BudgetAlertsResponse {
    pub alerts: Vec<BudgetAlert>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AlertSweepResponse {
    pub evaluated: usize,
    pub alerts_triggered: usize,
    pub failures: usize,
}
