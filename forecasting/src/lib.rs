//! Forecasting Crate
//!
//! Deterministic statistics that turn raw contribution, transaction and budget
//! records into savings-goal forecasts and budget alerts. Every function here is
//! pure and synchronous; "now" is always passed in by the caller.
//!
//! # Architecture
//!
//! - **Types**: Record and signal types are defined in the `shared-types` crate
//! - **Calculators**: Each signal has its own module and never fails; missing
//!   data produces a neutral default instead of an error
//!
//! # Available Calculators
//!
//! - `aggregate_by_month`: groups dated amounts into `YYYY-MM` buckets
//! - `calculate_contribution_stats`: average, trend and consistency of contributions
//! - `calculate_financial_trends`: run-rate income, expenses and surplus
//! - `calculate_historical_context`: average net, net trend, volatility, savings rate
//! - `calculate_competing_goals_impact`: demand from the user's other goals
//! - `calculate_budget_utilization`: spend against all active budgets
//! - `GoalCompletionPredictor`: combines the signals into a `GoalPrediction`
//! - `evaluate_budget_status`: on_track / warning / critical / exceeded
//! - `alert_engine`: threshold state machine for budget alerts
//!
//! # Example
//!
//! ```rust,ignore
//! use forecasting::{build_prediction_factors, ForecastInputs, GoalCompletionPredictor};
//!
//! let factors = build_prediction_factors(&inputs, now.date_naive());
//! let prediction = GoalCompletionPredictor::default().predict(&goal, factors, None, now);
//! ```

pub mod alert_engine;
pub mod budget_status;
pub mod budget_utilization;
pub mod competing_goals;
pub mod contribution_stats;
pub mod financial_trends;
pub mod historical_context;
pub mod predictor;
pub mod time_series;

pub use alert_engine::{AlertError, AlertEvaluation};
pub use budget_status::{classify_budget_status, evaluate_budget_status, BudgetStatusReport};
pub use budget_utilization::calculate_budget_utilization;
pub use competing_goals::calculate_competing_goals_impact;
pub use contribution_stats::calculate_contribution_stats;
pub use financial_trends::calculate_financial_trends;
pub use historical_context::calculate_historical_context;
pub use predictor::{build_prediction_factors, ForecastInputs, GoalCompletionPredictor};
pub use time_series::{aggregate_by_month, MonetaryEvent, MonthBucket};
