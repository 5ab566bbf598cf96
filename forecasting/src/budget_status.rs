use chrono::{Duration, Months, NaiveDate};
use shared_types::{Budget, BudgetPeriod, BudgetStatus};

use crate::time_series::{parse_date, round_to};

pub const WARNING_THRESHOLD: f64 = 70.0;
pub const CRITICAL_THRESHOLD: f64 = 90.0;
pub const EXCEEDED_THRESHOLD: f64 = 100.0;

/// Point-in-time status of a single budget
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetStatusReport {
    pub status: BudgetStatus,
    pub percentage_spent: f64,
    /// `None` for open-ended periods
    pub days_remaining: Option<i64>,
}

pub fn percentage_spent(spent: f64, amount: f64) -> f64 {
    if amount > 0.0 {
        spent / amount * 100.0
    } else if spent > 0.0 {
        EXCEEDED_THRESHOLD
    } else {
        0.0
    }
}

// TODO: confirm with product whether exactly 100% should read as critical rather than exceeded
pub fn classify_budget_status(percentage: f64) -> BudgetStatus {
    if percentage >= EXCEEDED_THRESHOLD {
        BudgetStatus::Exceeded
    } else if percentage >= CRITICAL_THRESHOLD {
        BudgetStatus::Critical
    } else if percentage >= WARNING_THRESHOLD {
        BudgetStatus::Warning
    } else {
        BudgetStatus::OnTrack
    }
}

/// Last day of the budget's current period, if the period has one.
pub fn period_end(budget: &Budget) -> Option<NaiveDate> {
    if let Some(end) = budget.end_date.as_deref().and_then(parse_date) {
        return Some(end);
    }

    let start = parse_date(&budget.start_date)?;
    let next_start = match budget.period {
        BudgetPeriod::Weekly => start.checked_add_signed(Duration::days(7)),
        BudgetPeriod::Monthly => start.checked_add_months(Months::new(1)),
        BudgetPeriod::Quarterly => start.checked_add_months(Months::new(3)),
        BudgetPeriod::Yearly => start.checked_add_months(Months::new(12)),
        BudgetPeriod::Custom => None,
    }?;

    next_start.pred_opt()
}

pub fn days_remaining(end: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    end.map(|end| (end - today).num_days().max(0))
}

pub fn evaluate_budget_status(budget: &Budget, today: NaiveDate) -> BudgetStatusReport {
    let percentage = percentage_spent(budget.spent, budget.amount);

    BudgetStatusReport {
        status: classify_budget_status(percentage),
        percentage_spent: round_to(percentage, 1),
        days_remaining: days_remaining(period_end(budget), today),
    }
}

/// Return a copy of `budget` with its derived status filled in.
pub fn with_derived_status(mut budget: Budget) -> Budget {
    budget.status = classify_budget_status(percentage_spent(budget.spent, budget.amount));
    budget
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(period: BudgetPeriod, start: &str, end: Option<&str>) -> Budget {
        Budget {
            id: 1,
            user_id: "user-1".to_string(),
            category: "dining".to_string(),
            amount: 400.0,
            spent: 300.0,
            period,
            start_date: start.to_string(),
            end_date: end.map(str::to_string),
            is_active: true,
            status: BudgetStatus::OnTrack,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify_budget_status(105.0), BudgetStatus::Exceeded);
        assert_eq!(classify_budget_status(100.0), BudgetStatus::Exceeded);
        assert_eq!(classify_budget_status(95.0), BudgetStatus::Critical);
        assert_eq!(classify_budget_status(90.0), BudgetStatus::Critical);
        assert_eq!(classify_budget_status(75.0), BudgetStatus::Warning);
        assert_eq!(classify_budget_status(50.0), BudgetStatus::OnTrack);
    }

    #[test]
    fn test_percentage_spent_zero_amount() {
        assert_eq!(percentage_spent(10.0, 0.0), 100.0);
        assert_eq!(percentage_spent(0.0, 0.0), 0.0);
        assert_eq!(percentage_spent(50.0, 200.0), 25.0);
    }

    #[test]
    fn test_period_end() {
        let monthly = budget(BudgetPeriod::Monthly, "2026-01-31", None);
        assert_eq!(period_end(&monthly), Some(date("2026-02-27")));

        let weekly = budget(BudgetPeriod::Weekly, "2026-03-02", None);
        assert_eq!(period_end(&weekly), Some(date("2026-03-08")));

        let yearly = budget(BudgetPeriod::Yearly, "2026-01-01", None);
        assert_eq!(period_end(&yearly), Some(date("2026-12-31")));

        let explicit = budget(BudgetPeriod::Monthly, "2026-01-01", Some("2026-01-20"));
        assert_eq!(period_end(&explicit), Some(date("2026-01-20")));

        let open = budget(BudgetPeriod::Custom, "2026-01-01", None);
        assert_eq!(period_end(&open), None);
    }

    #[test]
    fn test_days_remaining_floors_at_zero() {
        assert_eq!(days_remaining(Some(date("2026-01-31")), date("2026-01-21")), Some(10));
        assert_eq!(days_remaining(Some(date("2026-01-31")), date("2026-02-10")), Some(0));
        assert_eq!(days_remaining(None, date("2026-02-10")), None);
    }

    #[test]
    fn test_evaluate_budget_status() {
        let report = evaluate_budget_status(
            &budget(BudgetPeriod::Monthly, "2026-04-01", None),
            date("2026-04-20"),
        );
        assert_eq!(report.status, BudgetStatus::Warning);
        assert_eq!(report.percentage_spent, 75.0);
        assert_eq!(report.days_remaining, Some(10));
    }

    #[test]
    fn test_with_derived_status() {
        let mut stale = budget(BudgetPeriod::Monthly, "2026-04-01", None);
        stale.spent = 420.0;
        assert_eq!(with_derived_status(stale).status, BudgetStatus::Exceeded);
    }
}
