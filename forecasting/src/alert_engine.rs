//! Threshold state machine for budget alerts.
//!
//! Every budget remembers the highest band it was last evaluated in
//! ([`AlertState`]). A new alert is raised only when an evaluation lands in a
//! higher band than the remembered one, so repeated reads at an unchanged spend
//! never produce duplicates. Falling back into a lower band re-arms the
//! thresholds above it.
//!
//! Alert records themselves move through `acknowledge` and `dismiss`, both of
//! which return a new record and leave the input untouched.

use chrono::{DateTime, NaiveDate, Utc};
use shared_types::{AlertState, AlertType, Budget, BudgetAlert, ThresholdBand};

use crate::budget_status::{
    percentage_spent, period_end, CRITICAL_THRESHOLD, EXCEEDED_THRESHOLD, WARNING_THRESHOLD,
};
use crate::time_series::{parse_date, round_to};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlertError {
    #[error("Alert {0} has already been dismissed")]
    AlreadyDismissed(i64),
}

/// Outcome of evaluating one budget: the state to persist and, at most, one new alert
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvaluation {
    pub state: AlertState,
    pub alert: Option<BudgetAlert>,
}

pub fn band_for_percentage(percentage: f64) -> ThresholdBand {
    if percentage >= EXCEEDED_THRESHOLD {
        ThresholdBand::Exceeded
    } else if percentage >= CRITICAL_THRESHOLD {
        ThresholdBand::Critical
    } else if percentage >= WARNING_THRESHOLD {
        ThresholdBand::Approaching
    } else {
        ThresholdBand::None
    }
}

pub fn band_threshold(band: ThresholdBand) -> f64 {
    match band {
        ThresholdBand::None => 0.0,
        ThresholdBand::Approaching => WARNING_THRESHOLD,
        ThresholdBand::Critical => CRITICAL_THRESHOLD,
        ThresholdBand::Exceeded => EXCEEDED_THRESHOLD,
    }
}

/// Linear run-rate projection of spend at the end of the current period.
///
/// `None` when the period is open-ended, not started yet, or already over.
pub fn projected_spend(budget: &Budget, today: NaiveDate) -> Option<f64> {
    let start = parse_date(&budget.start_date)?;
    let end = period_end(budget)?;
    if today < start || today >= end {
        return None;
    }

    let elapsed_days = (today - start).num_days() + 1;
    let total_days = (end - start).num_days() + 1;
    Some(budget.spent / elapsed_days as f64 * total_days as f64)
}

pub fn evaluate(budget: &Budget, previous: &AlertState, now: DateTime<Utc>) -> AlertEvaluation {
    let today = now.date_naive();

    let baseline = if previous.period_start.as_deref() == Some(budget.start_date.as_str()) {
        previous.clone()
    } else {
        AlertState::default()
    };

    let percentage = percentage_spent(budget.spent, budget.amount);
    let band = band_for_percentage(percentage);

    let mut state = AlertState {
        band,
        overspend_predicted: false,
        achievement_recorded: baseline.achievement_recorded,
        period_start: Some(budget.start_date.clone()),
    };
    let mut alert = None;

    // A closed period under budget is reported as an achievement, not a warning
    let period_over = period_end(budget).is_some_and(|end| today > end);
    let closed_under_budget = period_over && percentage < EXCEEDED_THRESHOLD;

    if band > baseline.band && !closed_under_budget {
        let alert_type = if band == ThresholdBand::Exceeded {
            AlertType::Exceeded
        } else {
            AlertType::Approaching
        };
        alert = Some(new_alert(
            budget,
            alert_type,
            band_threshold(band),
            recommendation_for_band(budget, band, percentage),
            now,
        ));
    }

    if band < ThresholdBand::Exceeded {
        if let Some(projected) = projected_spend(budget, today).filter(|p| *p > budget.amount) {
            if baseline.overspend_predicted {
                state.overspend_predicted = true;
            } else if alert.is_none() {
                state.overspend_predicted = true;
                alert = Some(new_alert(
                    budget,
                    AlertType::PredictedOverspend,
                    EXCEEDED_THRESHOLD,
                    format!(
                        "At the current pace you will spend about {:.2} on {} this period, above the {:.2} budget. Slowing down now keeps you on track.",
                        projected, budget.category, budget.amount
                    ),
                    now,
                ));
            }
        }
    }

    if closed_under_budget
        && !baseline.achievement_recorded
        && alert.is_none()
    {
        state.achievement_recorded = true;
        alert = Some(new_alert(
            budget,
            AlertType::Achievement,
            round_to(percentage, 1),
            format!(
                "You finished the period within your {} budget, using {:.0}% with {:.2} to spare.",
                budget.category,
                percentage,
                budget.amount - budget.spent
            ),
            now,
        ));
    }

    if let Some(alert) = &alert {
        tracing::debug!(
            "Budget {} crossed into {:?} ({:.1}%), raising {:?} alert",
            budget.id,
            band,
            percentage,
            alert.alert_type
        );
    }

    AlertEvaluation { state, alert }
}

/// Mark an alert as seen. Acknowledging twice keeps the first timestamp.
pub fn acknowledge(alert: &BudgetAlert, at: i64) -> Result<BudgetAlert, AlertError> {
    if alert.dismissed_at.is_some() {
        return Err(AlertError::AlreadyDismissed(alert.id));
    }

    let mut acknowledged = alert.clone();
    acknowledged.acknowledged_at.get_or_insert(at);
    Ok(acknowledged)
}

/// Remove an alert from the active list. Band state is left alone, so a later
/// re-crossing (after a drop below the threshold) still raises a fresh alert.
pub fn dismiss(alert: &BudgetAlert, at: i64) -> Result<BudgetAlert, AlertError> {
    if alert.dismissed_at.is_some() {
        return Err(AlertError::AlreadyDismissed(alert.id));
    }

    let mut dismissed = alert.clone();
    dismissed.dismissed_at = Some(at);
    Ok(dismissed)
}

fn new_alert(
    budget: &Budget,
    alert_type: AlertType,
    threshold_percentage: f64,
    recommendation: String,
    now: DateTime<Utc>,
) -> BudgetAlert {
    BudgetAlert {
        id: 0,
        budget_id: budget.id,
        user_id: budget.user_id.clone(),
        alert_type,
        threshold_percentage,
        current_spent: budget.spent,
        budget_amount: budget.amount,
        ai_recommendation: Some(recommendation),
        triggered_at: now.timestamp(),
        acknowledged_at: None,
        dismissed_at: None,
    }
}

fn recommendation_for_band(budget: &Budget, band: ThresholdBand, percentage: f64) -> String {
    let left = budget.amount - budget.spent;
    match band {
        ThresholdBand::Exceeded => format!(
            "Your {} budget is over by {:.2}. Review recent {} spending and consider adjusting next period's budget.",
            budget.category, -left, budget.category
        ),
        ThresholdBand::Critical => format!(
            "You've used {:.0}% of your {} budget and only {:.2} is left. Hold off on non-essential {} purchases until the period resets.",
            percentage, budget.category, left, budget.category
        ),
        _ => format!(
            "You've used {:.0}% of your {} budget ({:.2} of {:.2}). Consider slowing spending in this category.",
            percentage, budget.category, budget.spent, budget.amount
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared_types::{BudgetPeriod, BudgetStatus};

    fn budget(spent: f64) -> Budget {
        Budget {
            id: 9,
            user_id: "user-1".to_string(),
            category: "groceries".to_string(),
            amount: 100.0,
            spent,
            period: BudgetPeriod::Custom,
            start_date: "2026-04-01".to_string(),
            end_date: None,
            is_active: true,
            status: BudgetStatus::OnTrack,
        }
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    /// Run a series of spend levels through the engine, carrying state forward.
    fn run(levels: &[f64]) -> Vec<Option<AlertType>> {
        let mut state = AlertState::default();
        levels
            .iter()
            .map(|spent| {
                let evaluation = evaluate(&budget(*spent), &state, at(2026, 4, 10));
                state = evaluation.state;
                evaluation.alert.map(|a| a.alert_type)
            })
            .collect()
    }

    #[test]
    fn test_band_for_percentage() {
        assert_eq!(band_for_percentage(10.0), ThresholdBand::None);
        assert_eq!(band_for_percentage(70.0), ThresholdBand::Approaching);
        assert_eq!(band_for_percentage(95.0), ThresholdBand::Critical);
        assert_eq!(band_for_percentage(100.0), ThresholdBand::Exceeded);
    }

    #[test]
    fn test_first_crossing_raises_alert() {
        let evaluation = evaluate(&budget(75.0), &AlertState::default(), at(2026, 4, 10));
        let alert = evaluation.alert.unwrap();
        assert_eq!(alert.alert_type, AlertType::Approaching);
        assert_eq!(alert.threshold_percentage, 70.0);
        assert_eq!(alert.current_spent, 75.0);
        assert_eq!(alert.budget_amount, 100.0);
        assert_eq!(alert.budget_id, 9);
        assert!(alert.ai_recommendation.unwrap().contains("groceries"));
        assert_eq!(evaluation.state.band, ThresholdBand::Approaching);
    }

    #[test]
    fn test_no_duplicate_alerts_at_stable_spend() {
        let alerts = run(&[75.0, 75.0, 80.0]);
        assert_eq!(alerts, vec![Some(AlertType::Approaching), None, None]);
    }

    #[test]
    fn test_escalation_through_bands() {
        let alerts = run(&[75.0, 95.0, 105.0, 110.0, 120.0]);
        assert_eq!(
            alerts,
            vec![
                Some(AlertType::Approaching),
                Some(AlertType::Approaching),
                Some(AlertType::Exceeded),
                None,
                None,
            ]
        );
    }

    #[test]
    fn test_jump_straight_to_exceeded_raises_single_alert() {
        let alerts = run(&[0.0, 130.0, 130.0]);
        assert_eq!(alerts, vec![None, Some(AlertType::Exceeded), None]);
    }

    #[test]
    fn test_drop_below_rearms_threshold() {
        let alerts = run(&[105.0, 100.0, 60.0, 104.0]);
        assert_eq!(
            alerts,
            vec![Some(AlertType::Exceeded), None, None, Some(AlertType::Exceeded)]
        );
    }

    #[test]
    fn test_new_period_resets_state() {
        let previous = AlertState {
            band: ThresholdBand::Exceeded,
            overspend_predicted: false,
            achievement_recorded: false,
            period_start: Some("2026-03-01".to_string()),
        };
        let evaluation = evaluate(&budget(75.0), &previous, at(2026, 4, 10));
        assert_eq!(evaluation.alert.unwrap().alert_type, AlertType::Approaching);
        assert_eq!(evaluation.state.period_start.as_deref(), Some("2026-04-01"));
    }

    #[test]
    fn test_predicted_overspend() {
        let mut monthly = budget(0.0);
        monthly.period = BudgetPeriod::Monthly;
        monthly.amount = 300.0;
        monthly.spent = 150.0;

        // 150 spent in 10 of 30 days projects to 450
        assert_eq!(projected_spend(&monthly, at(2026, 4, 10).date_naive()), Some(450.0));

        let first = evaluate(&monthly, &AlertState::default(), at(2026, 4, 10));
        let alert = first.alert.unwrap();
        assert_eq!(alert.alert_type, AlertType::PredictedOverspend);
        assert_eq!(alert.threshold_percentage, 100.0);
        assert!(first.state.overspend_predicted);

        let second = evaluate(&monthly, &first.state, at(2026, 4, 11));
        assert!(second.alert.is_none());
        assert!(second.state.overspend_predicted);
    }

    #[test]
    fn test_achievement_once_period_ends() {
        let mut monthly = budget(40.0);
        monthly.period = BudgetPeriod::Monthly;
        monthly.start_date = "2026-03-01".to_string();

        let first = evaluate(&monthly, &AlertState::default(), at(2026, 4, 2));
        assert_eq!(first.alert.unwrap().alert_type, AlertType::Achievement);
        assert!(first.state.achievement_recorded);

        let second = evaluate(&monthly, &first.state, at(2026, 4, 3));
        assert!(second.alert.is_none());
    }

    #[test]
    fn test_closed_period_in_warning_band_reports_achievement() {
        let mut monthly = budget(85.0);
        monthly.period = BudgetPeriod::Monthly;
        monthly.start_date = "2026-03-01".to_string();

        let first = evaluate(&monthly, &AlertState::default(), at(2026, 4, 2));
        let alert = first.alert.unwrap();
        assert_eq!(alert.alert_type, AlertType::Achievement);
        assert_eq!(alert.threshold_percentage, 85.0);
        assert_eq!(first.state.band, ThresholdBand::Approaching);
        assert!(first.state.achievement_recorded);

        let second = evaluate(&monthly, &first.state, at(2026, 4, 3));
        assert!(second.alert.is_none());
    }

    #[test]
    fn test_closed_period_over_budget_still_reports_exceeded() {
        let mut monthly = budget(120.0);
        monthly.period = BudgetPeriod::Monthly;
        monthly.start_date = "2026-03-01".to_string();

        let evaluation = evaluate(&monthly, &AlertState::default(), at(2026, 4, 2));
        assert_eq!(evaluation.alert.unwrap().alert_type, AlertType::Exceeded);
        assert!(!evaluation.state.achievement_recorded);
    }

    #[test]
    fn test_acknowledge_and_dismiss() {
        let alert = evaluate(&budget(95.0), &AlertState::default(), at(2026, 4, 10))
            .alert
            .unwrap();

        let acknowledged = acknowledge(&alert, 1_000).unwrap();
        assert_eq!(acknowledged.acknowledged_at, Some(1_000));
        assert!(acknowledged.is_active());
        assert_eq!(alert.acknowledged_at, None);

        let again = acknowledge(&acknowledged, 2_000).unwrap();
        assert_eq!(again.acknowledged_at, Some(1_000));

        let dismissed = dismiss(&acknowledged, 3_000).unwrap();
        assert_eq!(dismissed.dismissed_at, Some(3_000));
        assert!(!dismissed.is_active());

        assert_eq!(dismiss(&dismissed, 4_000), Err(AlertError::AlreadyDismissed(alert.id)));
        assert_eq!(acknowledge(&dismissed, 4_000), Err(AlertError::AlreadyDismissed(alert.id)));
    }
}
