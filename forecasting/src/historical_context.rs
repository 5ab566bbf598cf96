use shared_types::{HistoricalContext, MonthlySummary, NetTrend, Volatility};

use crate::time_series::{mean, population_std_dev, round_to};

pub const MAX_SUMMARY_MONTHS: usize = 6;

const IMPROVING_FACTOR: f64 = 1.15;
const DECLINING_FACTOR: f64 = 0.85;
const HIGH_VOLATILITY_RATIO: f64 = 0.3;

/// `summaries` must be ordered newest first; only the first six are used.
pub fn calculate_historical_context(summaries: &[MonthlySummary]) -> HistoricalContext {
    let recent = &summaries[..summaries.len().min(MAX_SUMMARY_MONTHS)];

    if recent.is_empty() {
        return HistoricalContext {
            average_monthly_net: 0.0,
            net_trend: NetTrend::Stable,
            volatility: Volatility::Unknown,
            savings_rate_avg: 0.0,
        };
    }

    let nets: Vec<f64> = recent.iter().map(|s| s.net).collect();
    let incomes: Vec<f64> = recent.iter().map(|s| s.income).collect();

    let average_net = mean(&nets);
    let average_income = mean(&incomes);

    let savings_rate_avg = if average_income > 0.0 {
        round_to(average_net / average_income * 100.0, 1)
    } else {
        0.0
    };

    HistoricalContext {
        average_monthly_net: round_to(average_net, 2),
        net_trend: net_trend(&nets),
        volatility: volatility(&nets, average_net),
        savings_rate_avg,
    }
}

/// Index `[0..mid)` holds the newer months, `[mid..)` the older ones.
fn net_trend(nets_newest_first: &[f64]) -> NetTrend {
    if nets_newest_first.len() < 2 {
        return NetTrend::Stable;
    }

    let mid = nets_newest_first.len() / 2;
    let recent_half = mean(&nets_newest_first[..mid]);
    let older_half = mean(&nets_newest_first[mid..]);

    if recent_half > older_half * IMPROVING_FACTOR {
        NetTrend::Improving
    } else if recent_half < older_half * DECLINING_FACTOR {
        NetTrend::Declining
    } else {
        NetTrend::Stable
    }
}

fn volatility(nets: &[f64], average_net: f64) -> Volatility {
    if average_net <= 0.0 {
        return Volatility::Low;
    }

    let ratio = population_std_dev(nets) / average_net.abs();
    if ratio > HIGH_VOLATILITY_RATIO {
        Volatility::High
    } else {
        Volatility::Low
    }
}
