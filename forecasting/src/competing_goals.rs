use chrono::NaiveDate;
use shared_types::{CompetingGoalsImpact, SavingsGoal};

use crate::time_series::{months_until, parse_date, round_to};

/// Goals at or above this priority (1 = highest) count as high priority.
const HIGH_PRIORITY_CUTOFF: i32 = 2;

/// `goals` are the user's other active goals, excluding the one being forecast.
pub fn calculate_competing_goals_impact(goals: &[SavingsGoal], today: NaiveDate) -> CompetingGoalsImpact {
    let mut total_competing_target = 0.0;
    let mut pressure = 0.0;

    for goal in goals {
        let remaining = goal.remaining();
        if remaining <= 0.0 {
            continue;
        }
        total_competing_target += remaining;

        // Goals without a deadline are not time-boxed and add no monthly pressure
        if let Some(target) = goal.target_date.as_deref().and_then(parse_date) {
            pressure += remaining / months_until(today, target) as f64;
        }
    }

    CompetingGoalsImpact {
        competing_goals_count: goals.len(),
        total_competing_target: round_to(total_competing_target, 2),
        high_priority_competitors: goals
            .iter()
            .filter(|g| g.priority <= HIGH_PRIORITY_CUTOFF)
            .count(),
        estimated_monthly_allocation_pressure: round_to(pressure, 2),
    }
}
