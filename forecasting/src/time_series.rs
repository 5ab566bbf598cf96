use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Per-month totals keyed by `YYYY-MM`. Iteration is in chronological order.
pub type MonthBucket = BTreeMap<String, f64>;

/// A dated amount, the unit every calculator aggregates over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonetaryEvent {
    pub date: NaiveDate,
    pub amount: f64,
}

impl MonetaryEvent {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }

    /// Build an event from a stored `YYYY-MM-DD` date. Returns `None` when the
    /// date cannot be parsed.
    pub fn from_record(date: &str, amount: f64) -> Option<Self> {
        match parse_date(date) {
            Some(date) => Some(Self { date, amount }),
            None => {
                tracing::debug!("Skipping record with unparsable date: {:?}", date);
                None
            }
        }
    }
}

/// Parse `YYYY-MM-DD`, tolerating a trailing time component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub fn aggregate_by_month(events: &[MonetaryEvent]) -> MonthBucket {
    let mut buckets = MonthBucket::new();
    for event in events {
        *buckets.entry(month_key(event.date)).or_insert(0.0) += event.amount;
    }
    buckets
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Means of `values[..n/2]` and `values[n/2..]`. An empty half has mean 0.
pub fn half_split_means(values: &[f64]) -> (f64, f64) {
    let mid = values.len() / 2;
    (mean(&values[..mid]), mean(&values[mid..]))
}

/// Calendar months from `today` to `target`, never less than 1.
pub fn months_until(today: NaiveDate, target: NaiveDate) -> u32 {
    let months = (target.year() - today.year()) as i64 * 12
        + (target.month() as i64 - today.month() as i64);
    months.max(1) as u32
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
