use shared_types::{Budget, BudgetDiscipline, BudgetUtilization};

use crate::time_series::round_to;

pub fn calculate_budget_utilization(budgets: &[Budget]) -> BudgetUtilization {
    let total_budgeted: f64 = budgets.iter().map(|b| b.amount).sum();
    let total_spent: f64 = budgets.iter().map(|b| b.spent).sum();

    let utilization_rate = if total_budgeted > 0.0 {
        round_to(total_spent / total_budgeted * 100.0, 1)
    } else {
        0.0
    };

    let budget_discipline = if budgets.is_empty() {
        BudgetDiscipline::Unknown
    } else if utilization_rate > 100.0 {
        BudgetDiscipline::Overspending
    } else if utilization_rate > 90.0 {
        BudgetDiscipline::Tight
    } else if utilization_rate < 50.0 {
        BudgetDiscipline::Conservative
    } else {
        BudgetDiscipline::Good
    };

    BudgetUtilization {
        total_budgeted: round_to(total_budgeted, 2),
        total_spent: round_to(total_spent, 2),
        utilization_rate,
        budget_discipline,
    }
}
