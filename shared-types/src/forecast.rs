use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Coarse direction of a monthly series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    NoData,
    Increasing,
    Decreasing,
    Stable,
}

/// Direction of net income over recent months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum NetTrend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    High,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BudgetDiscipline {
    Good,
    Tight,
    Overspending,
    Conservative,
    Unknown,
}

/// Statistics over a goal's contribution history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ContributionStats {
    pub total: f64,
    pub count: usize,
    pub monthly_average: f64,
    pub trend: Trend,
    pub consistency_score: f64,
}

impl Default for ContributionStats {
    fn default() -> Self {
        Self {
            total: 0.0,
            count: 0,
            monthly_average: 0.0,
            trend: Trend::NoData,
            consistency_score: 0.0,
        }
    }
}

/// Run-rate income and expenses over the lookback window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinancialTrends {
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub monthly_surplus: f64,
    pub income_trend: Trend,
    pub expense_trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HistoricalContext {
    pub average_monthly_net: f64,
    pub net_trend: NetTrend,
    pub volatility: Volatility,
    pub savings_rate_avg: f64,
}

/// Demand placed on monthly savings by the user's other goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CompetingGoalsImpact {
    pub competing_goals_count: usize,
    pub total_competing_target: f64,
    pub high_priority_competitors: usize,
    pub estimated_monthly_allocation_pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BudgetUtilization {
    pub total_budgeted: f64,
    pub total_spent: f64,
    pub utilization_rate: f64,
    pub budget_discipline: BudgetDiscipline,
}

/// The structured signals a prediction was computed from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PredictionFactors {
    pub contribution_stats: ContributionStats,
    pub financial_trends: FinancialTrends,
    pub historical_context: HistoricalContext,
    pub competing_goals: CompetingGoalsImpact,
    pub budget_utilization: BudgetUtilization,
}

/// Free-text output of the narrative service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PredictionNarrative {
    pub ai_insights: Vec<String>,
    pub risk_factors: Vec<String>,
    pub opportunities: Vec<String>,
}

impl PredictionNarrative {
    pub fn is_empty(&self) -> bool {
        self.ai_insights.is_empty() && self.risk_factors.is_empty() && self.opportunities.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthlyProjection {
    /// `YYYY-MM`
    pub month: String,
    pub projected_amount: f64,
}

/// Completion forecast for a savings goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GoalPrediction {
    pub id: i64,
    pub goal_id: i64,
    /// `YYYY-MM-DD`
    pub predicted_completion_date: String,
    pub confidence_score: f64,
    pub recommended_monthly_amount: f64,
    pub minimum_monthly_amount: f64,
    pub monthly_projections: Vec<MonthlyProjection>,
    pub ai_insights: Vec<String>,
    pub risk_factors: Vec<String>,
    pub opportunities: Vec<String>,
    pub model_version: String,
    pub prediction_factors: PredictionFactors,
    pub created_at: i64,
}

/// Response for the predict endpoint
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PredictionResponse {
    pub prediction: GoalPrediction,
    pub persisted: bool,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PredictionsResponse {
    pub predictions: Vec<GoalPrediction>,
}
