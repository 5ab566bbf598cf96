use shared_types::{ContributionStats, GoalContribution, Trend};

use crate::time_series::{
    aggregate_by_month, half_split_means, mean, population_std_dev, round_to, MonetaryEvent,
};

const INCREASE_FACTOR: f64 = 1.1;
const DECREASE_FACTOR: f64 = 0.9;

/// Convert stored contributions into events, dropping rows with bad dates.
pub fn contribution_events(contributions: &[GoalContribution]) -> Vec<MonetaryEvent> {
    contributions
        .iter()
        .filter_map(|c| MonetaryEvent::from_record(&c.contribution_date, c.amount))
        .collect()
}

pub fn calculate_contribution_stats(contributions: &[MonetaryEvent]) -> ContributionStats {
    if contributions.is_empty() {
        return ContributionStats::default();
    }

    let total: f64 = contributions.iter().map(|c| c.amount).sum();
    let monthly_totals: Vec<f64> = aggregate_by_month(contributions).into_values().collect();

    let average = mean(&monthly_totals);
    let monthly_average = average.round();

    let consistency_score = if average == 0.0 || monthly_average == 0.0 {
        0.0
    } else {
        let ratio = population_std_dev(&monthly_totals) / average;
        round_to((1.0 - ratio).clamp(0.0, 1.0), 2)
    };

    ContributionStats {
        total: round_to(total, 2),
        count: contributions.len(),
        monthly_average,
        trend: contribution_trend(&monthly_totals),
        consistency_score,
    }
}

fn contribution_trend(monthly_totals: &[f64]) -> Trend {
    if monthly_totals.len() < 2 {
        return Trend::Stable;
    }

    let (first_half, second_half) = half_split_means(monthly_totals);
    if second_half > first_half * INCREASE_FACTOR {
        Trend::Increasing
    } else if second_half < first_half * DECREASE_FACTOR {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}
