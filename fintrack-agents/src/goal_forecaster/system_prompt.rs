use shared_types::{GoalPrediction, PredictionFactors, SavingsGoal};

use super::types::NarrativeResponse;

pub fn build_system_prompt(goal: &SavingsGoal, preview: &GoalPrediction) -> String {
    let schema = schemars::schema_for!(NarrativeResponse);
    let schema_json =
        serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are a personal finance coach. You explain savings-goal forecasts in plain language. The numbers below were computed by a deterministic model; do not recalculate or contradict them.

## Goal

- **Name:** {name}
- **Target amount:** {target:.2}
- **Saved so far:** {current:.2}
- **Remaining:** {remaining:.2}
- **Priority:** {priority} (1 highest, 5 lowest)
- **Target date:** {target_date}

## Forecast

- **Predicted completion date:** {predicted_date}
- **Confidence:** {confidence:.2}
- **Recommended monthly contribution:** {recommended:.2}
- **Minimum monthly contribution:** {minimum:.2}

## Signals

{signals}

## Your Task

1. Write 2-4 short insights about how the user is tracking toward this goal
2. List the main risks that could delay the goal
3. List concrete opportunities to reach it sooner

Keep each item to one sentence and refer to the numbers above where useful.

## Output Format

Reply with a single JSON object matching this schema and nothing else:

```json
{schema_json}
```"#,
        name = goal.name,
        target = goal.target_amount,
        current = goal.current_amount,
        remaining = goal.remaining().max(0.0),
        priority = goal.priority,
        target_date = goal.target_date.as_deref().unwrap_or("none"),
        predicted_date = preview.predicted_completion_date,
        confidence = preview.confidence_score,
        recommended = preview.recommended_monthly_amount,
        minimum = preview.minimum_monthly_amount,
        signals = format_signals(&preview.prediction_factors),
        schema_json = schema_json,
    )
}

pub fn build_user_message(goal: &SavingsGoal) -> String {
    format!(
        "Please explain the forecast for my \"{}\" savings goal.",
        goal.name
    )
}

fn format_signals(factors: &PredictionFactors) -> String {
    let stats = &factors.contribution_stats;
    let trends = &factors.financial_trends;
    let history = &factors.historical_context;
    let competing = &factors.competing_goals;
    let budgets = &factors.budget_utilization;

    let mut output = String::new();
    output.push_str(&format!(
        "- **Contributions:** {} totalling {:.2}, monthly average {:.0}, trend {:?}, consistency {:.2}\n",
        stats.count, stats.total, stats.monthly_average, stats.trend, stats.consistency_score
    ));
    output.push_str(&format!(
        "- **Cash flow (6-month run rate):** income {:.2}, expenses {:.2}, surplus {:.2}; income {:?}, expenses {:?}\n",
        trends.monthly_income,
        trends.monthly_expenses,
        trends.monthly_surplus,
        trends.income_trend,
        trends.expense_trend
    ));
    output.push_str(&format!(
        "- **History:** average monthly net {:.2}, net trend {:?}, volatility {:?}, savings rate {:.1}%\n",
        history.average_monthly_net, history.net_trend, history.volatility, history.savings_rate_avg
    ));
    output.push_str(&format!(
        "- **Competing goals:** {} other goals ({} high priority) needing {:.2}, about {:.2} per month\n",
        competing.competing_goals_count,
        competing.high_priority_competitors,
        competing.total_competing_target,
        competing.estimated_monthly_allocation_pressure
    ));
    output.push_str(&format!(
        "- **Budgets:** {:.2} spent of {:.2} budgeted ({:.1}%), discipline {:?}",
        budgets.total_spent, budgets.total_budgeted, budgets.utilization_rate, budgets.budget_discipline
    ));

    output
}
