use shared_types::*;
use std::fs;
use std::path::Path;
use ts_rs::TS;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate TypeScript definitions for API types
    let mut types = Vec::new();

    // Goal types
    types.push(clean_type(GoalStatus::export_to_string()?));
    types.push(clean_type(SavingsGoal::export_to_string()?));
    types.push(clean_type(GoalContribution::export_to_string()?));

    // Transaction types
    types.push(clean_type(TransactionType::export_to_string()?));
    types.push(clean_type(Transaction::export_to_string()?));
    types.push(clean_type(MonthlySummary::export_to_string()?));

    // Forecast signal types
    types.push(clean_type(Trend::export_to_string()?));
    types.push(clean_type(NetTrend::export_to_string()?));
    types.push(clean_type(Volatility::export_to_string()?));
    types.push(clean_type(BudgetDiscipline::export_to_string()?));
    types.push(clean_type(ContributionStats::export_to_string()?));
    types.push(clean_type(FinancialTrends::export_to_string()?));
    types.push(clean_type(HistoricalContext::export_to_string()?));
    types.push(clean_type(CompetingGoalsImpact::export_to_string()?));
    types.push(clean_type(BudgetUtilization::export_to_string()?));
    types.push(clean_type(PredictionFactors::export_to_string()?));

    // Prediction types
    types.push(clean_type(PredictionNarrative::export_to_string()?));
    types.push(clean_type(MonthlyProjection::export_to_string()?));
    types.push(clean_type(GoalPrediction::export_to_string()?));
    types.push(clean_type(PredictionResponse::export_to_string()?));
    types.push(clean_type(PredictionsResponse::export_to_string()?));

    // Budget types
    types.push(clean_type(BudgetPeriod::export_to_string()?));
    types.push(clean_type(BudgetStatus::export_to_string()?));
    types.push(clean_type(Budget::export_to_string()?));
    types.push(clean_type(AlertType::export_to_string()?));
    types.push(clean_type(BudgetAlert::export_to_string()?));
    types.push(clean_type(ThresholdBand::export_to_string()?));
    types.push(clean_type(AlertState::export_to_string()?));
    types.push(clean_type(BudgetStatusResponse::export_to_string()?));
    types.push(clean_type(BudgetAlertsResponse::export_to_string()?));
    types.push(clean_type(AlertSweepResponse::export_to_string()?));

    let output_dir = Path::new("../gui/src/api-types");
    fs::create_dir_all(output_dir)?;

    let output_path = output_dir.join("types.ts");
    let output = types.join("\n\n");

    fs::write(&output_path, output)?;
    println!("Generated TypeScript types in {}", output_path.display());

    Ok(())
}

fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    // Nested records (GoalPrediction -> PredictionFactors) carry their own imports
    let lines: Vec<&str> = type_def.lines().collect();
    let has_import = lines
        .iter()
        .any(|line| line.trim().starts_with("import type"));

    let filtered: Vec<&str> = lines
        .iter()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("import type") {
                return has_import;
            }
            !trimmed.starts_with("// This file was generated")
                && !trimmed.starts_with("/* This file was generated")
        })
        .cloned()
        .collect();

    let result = filtered.join("\n").trim().to_string();
    if result.is_empty() {
        result
    } else {
        format!("{}\n", result)
    }
}
