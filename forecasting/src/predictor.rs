use chrono::{DateTime, Months, NaiveDate, Utc};
use shared_types::{
    Budget, GoalContribution, GoalPrediction, MonthlyProjection, MonthlySummary,
    PredictionFactors, PredictionNarrative, SavingsGoal, Transaction,
};

use crate::budget_utilization::calculate_budget_utilization;
use crate::competing_goals::calculate_competing_goals_impact;
use crate::contribution_stats::{calculate_contribution_stats, contribution_events};
use crate::financial_trends::calculate_financial_trends;
use crate::historical_context::calculate_historical_context;
use crate::time_series::{month_key, months_until, parse_date, round_to};

pub const MODEL_VERSION: &str = "forecast-v1";
pub const DEFAULT_MONTHLY_VELOCITY: f64 = 100.0;

const EXPLICIT_DEADLINE_CONFIDENCE: f64 = 0.95;
const NO_HISTORY_CONFIDENCE: f64 = 0.5;
const MINIMUM_RATIO: f64 = 0.75;
const PROJECTION_MONTHS: u32 = 12;

/// Everything the calculators read for one goal
#[derive(Debug, Clone, Copy)]
pub struct ForecastInputs<'a> {
    pub contributions: &'a [GoalContribution],
    pub transactions: &'a [Transaction],
    /// Newest first
    pub monthly_summaries: &'a [MonthlySummary],
    /// The user's other active goals
    pub competing_goals: &'a [SavingsGoal],
    pub budgets: &'a [Budget],
}

pub fn build_prediction_factors(inputs: &ForecastInputs<'_>, today: NaiveDate) -> PredictionFactors {
    PredictionFactors {
        contribution_stats: calculate_contribution_stats(&contribution_events(inputs.contributions)),
        financial_trends: calculate_financial_trends(inputs.transactions, today),
        historical_context: calculate_historical_context(inputs.monthly_summaries),
        competing_goals: calculate_competing_goals_impact(inputs.competing_goals, today),
        budget_utilization: calculate_budget_utilization(inputs.budgets),
    }
}

/// Turns prediction factors into a completion date, a confidence score and
/// contribution recommendations.
///
/// Goals with a parseable `target_date` are planned backwards from the
/// deadline. Goals without one are projected forwards from the observed
/// savings velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalCompletionPredictor {
    pub default_monthly_velocity: f64,
}

impl Default for GoalCompletionPredictor {
    fn default() -> Self {
        Self::new(DEFAULT_MONTHLY_VELOCITY)
    }
}

impl GoalCompletionPredictor {
    pub fn new(default_monthly_velocity: f64) -> Self {
        Self {
            default_monthly_velocity,
        }
    }

    pub fn predict(
        &self,
        goal: &SavingsGoal,
        factors: PredictionFactors,
        narrative: Option<PredictionNarrative>,
        now: DateTime<Utc>,
    ) -> GoalPrediction {
        let today = now.date_naive();
        let remaining = goal.remaining();

        let plan = match goal.target_date.as_deref().and_then(parse_date) {
            Some(target) => Self::plan_for_deadline(remaining, target, today),
            None => self.plan_from_velocity(remaining, &factors, today),
        };

        let minimum_monthly_amount = (plan.recommended * MINIMUM_RATIO).ceil();
        let narrative = narrative.unwrap_or_default();

        GoalPrediction {
            id: 0,
            goal_id: goal.id,
            predicted_completion_date: plan.completion_date.format("%Y-%m-%d").to_string(),
            confidence_score: round_to(plan.confidence.clamp(0.0, 1.0), 2),
            recommended_monthly_amount: plan.recommended,
            minimum_monthly_amount,
            monthly_projections: project_balance(goal, plan.recommended, today),
            ai_insights: narrative.ai_insights,
            risk_factors: narrative.risk_factors,
            opportunities: narrative.opportunities,
            model_version: MODEL_VERSION.to_string(),
            prediction_factors: factors,
            created_at: now.timestamp(),
        }
    }

    fn plan_for_deadline(remaining: f64, target: NaiveDate, today: NaiveDate) -> Plan {
        let recommended = if remaining > 0.0 {
            (remaining / months_until(today, target) as f64).ceil()
        } else {
            0.0
        };

        Plan {
            completion_date: target,
            recommended,
            confidence: EXPLICIT_DEADLINE_CONFIDENCE,
        }
    }

    fn plan_from_velocity(&self, remaining: f64, factors: &PredictionFactors, today: NaiveDate) -> Plan {
        let stats = &factors.contribution_stats;
        let confidence = if stats.count > 0 {
            stats.consistency_score
        } else {
            NO_HISTORY_CONFIDENCE
        };

        if remaining <= 0.0 {
            return Plan {
                completion_date: today,
                recommended: 0.0,
                confidence,
            };
        }

        let velocity = if stats.monthly_average > 0.0 {
            stats.monthly_average
        } else if factors.financial_trends.monthly_surplus > 0.0 {
            factors.financial_trends.monthly_surplus
        } else {
            self.default_monthly_velocity.max(1.0)
        };

        let months_needed = (remaining / velocity).ceil() as u32;
        let completion_date = today
            .checked_add_months(Months::new(months_needed))
            .unwrap_or(NaiveDate::MAX);

        Plan {
            completion_date,
            recommended: velocity.ceil(),
            confidence,
        }
    }
}

struct Plan {
    completion_date: NaiveDate,
    recommended: f64,
    confidence: f64,
}

/// Balance after each of the next months at the recommended rate, stopping at the target.
fn project_balance(goal: &SavingsGoal, recommended: f64, today: NaiveDate) -> Vec<MonthlyProjection> {
    let mut projections = Vec::new();
    if recommended <= 0.0 || goal.remaining() <= 0.0 {
        return projections;
    }

    let mut balance = goal.current_amount;
    for offset in 1..=PROJECTION_MONTHS {
        let Some(month) = today.checked_add_months(Months::new(offset)) else {
            break;
        };
        balance = (balance + recommended).min(goal.target_amount);
        projections.push(MonthlyProjection {
            month: month_key(month),
            projected_amount: round_to(balance, 2),
        });
        if balance >= goal.target_amount {
            break;
        }
    }

    projections
}
