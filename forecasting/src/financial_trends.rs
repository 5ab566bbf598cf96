use chrono::{Duration, NaiveDate};
use shared_types::{FinancialTrends, Transaction, TransactionType, Trend};

use crate::time_series::{aggregate_by_month, half_split_means, round_to, MonetaryEvent};

/// Transactions older than this are outside the run-rate window.
pub const LOOKBACK_DAYS: i64 = 180;
/// Sums are divided by the full window, so empty months count as zero.
pub const LOOKBACK_MONTHS: f64 = 6.0;

const INCREASE_FACTOR: f64 = 1.15;
const DECREASE_FACTOR: f64 = 0.85;

pub fn lookback_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(LOOKBACK_DAYS)
}

pub fn calculate_financial_trends(transactions: &[Transaction], today: NaiveDate) -> FinancialTrends {
    let window_start = lookback_start(today);

    let mut income = Vec::new();
    let mut expenses = Vec::new();

    for transaction in transactions {
        let Some(event) =
            MonetaryEvent::from_record(&transaction.transaction_date, transaction.amount.abs())
        else {
            continue;
        };
        if event.date < window_start || event.date > today {
            continue;
        }
        match transaction.transaction_type {
            TransactionType::Income => income.push(event),
            TransactionType::Expense => expenses.push(event),
        }
    }

    let monthly_income = income.iter().map(|e| e.amount).sum::<f64>() / LOOKBACK_MONTHS;
    let monthly_expenses = expenses.iter().map(|e| e.amount).sum::<f64>() / LOOKBACK_MONTHS;

    FinancialTrends {
        monthly_income: round_to(monthly_income, 2),
        monthly_expenses: round_to(monthly_expenses, 2),
        monthly_surplus: round_to(monthly_income - monthly_expenses, 2),
        income_trend: series_trend(&income),
        expense_trend: series_trend(&expenses),
    }
}

fn series_trend(events: &[MonetaryEvent]) -> Trend {
    let monthly_totals: Vec<f64> = aggregate_by_month(events).into_values().collect();
    if monthly_totals.len() < 2 {
        return Trend::Stable;
    }

    let (first_half, second_half) = half_split_means(&monthly_totals);
    if second_half > first_half * INCREASE_FACTOR {
        Trend::Increasing
    } else if second_half < first_half * DECREASE_FACTOR {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
