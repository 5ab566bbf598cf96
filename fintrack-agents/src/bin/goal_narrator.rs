use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, File};
use rusqlite::{Connection, OptionalExtension};
use serde::Deserialize;
use shared_types::{GoalPrediction, GoalStatus, SavingsGoal};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fintrack_agents::storage::sqlite_storage::{SqliteAgentStorage, AGENT_TABLES_SQL};
use fintrack_agents::{ClaudeClient, GoalNarrativeAgent, NarrativeOptions};

#[derive(Parser, Debug)]
#[command(
    name = "goal-narrator",
    about = "Generate a narrative for a goal's latest stored prediction"
)]
struct Cli {
    /// Goal ID from the fintrack database
    #[arg(long)]
    goal_id: i64,

    /// Owner of the goal
    #[arg(long)]
    user_id: String,

    /// Override the Claude model ID
    #[arg(long)]
    model: Option<String>,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
struct ApiConfig {
    api_keys: Option<ApiKeysConfig>,
    database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize, Clone)]
struct ApiKeysConfig {
    claude_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
struct DatabaseConfig {
    path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let (config, config_path) = load_api_config().context("Failed to load fintrack API config")?;
    let api_key = config
        .api_keys
        .as_ref()
        .and_then(|keys| keys.claude_api_key.as_ref())
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Missing claude_api_key in config at {:?}", config_path))?;

    let db_path = resolve_db_path(&config)?;
    let conn = Connection::open(&db_path).with_context(|| format!("Failed to open db at {:?}", db_path))?;
    conn.execute_batch(AGENT_TABLES_SQL)?;

    let goal = load_goal(&conn, cli.goal_id, &cli.user_id)?;
    let preview = load_latest_prediction(&conn, goal.id)?;

    let mut options = NarrativeOptions {
        timeout: Duration::from_secs(cli.timeout_secs),
        ..NarrativeOptions::default()
    };
    if let Some(model) = cli.model {
        options.model = model;
    }

    let agent = GoalNarrativeAgent::new(
        Arc::new(ClaudeClient::new(api_key)?),
        Arc::new(SqliteAgentStorage::new(Arc::new(Mutex::new(conn)))),
        options,
    );

    let narrative = agent.narrate(&goal, &preview).await?;
    println!("{}", serde_json::to_string_pretty(&narrative)?);
    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
}

fn load_api_config() -> Result<(ApiConfig, PathBuf)> {
    let config_path = get_config_path();
    if !config_path.exists() {
        return Err(anyhow::anyhow!(
            "Config file not found at {:?}. Run fintrack-api once or create it.",
            config_path
        ));
    }

    let builder = Config::builder()
        .add_source(File::from(config_path.clone()))
        .build()?;

    let config: ApiConfig = builder.try_deserialize()?;
    Ok((config, config_path))
}

fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("fintrack").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

fn resolve_db_path(config: &ApiConfig) -> Result<PathBuf> {
    if let Some(path) = config.database.as_ref().and_then(|db| db.path.as_ref()) {
        return Ok(PathBuf::from(path));
    }

    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;
    Ok(data_dir.join("fintrack").join("db.sqlite"))
}

fn load_goal(conn: &Connection, goal_id: i64, user_id: &str) -> Result<SavingsGoal> {
    let row = conn
        .query_row(
            "SELECT id, user_id, name, target_amount, current_amount, priority, target_date, status
             FROM savings_goals WHERE id = ? AND user_id = ?",
            rusqlite::params![goal_id, user_id],
            |row| {
                Ok((
                    SavingsGoal {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                        target_amount: row.get(3)?,
                        current_amount: row.get(4)?,
                        priority: row.get(5)?,
                        target_date: row.get(6)?,
                        status: GoalStatus::Active,
                    },
                    row.get::<_, String>(7)?,
                ))
            },
        )
        .optional()?;

    let (mut goal, status) = row.ok_or_else(|| anyhow::anyhow!("No goal {} for user {}", goal_id, user_id))?;
    goal.status = status.parse()?;
    Ok(goal)
}

/// Raw row of `goal_predictions`, JSON columns still encoded
type PredictionRow = (i64, String, f64, f64, f64, String, String, String, String, String, String, i64);

fn load_latest_prediction(conn: &Connection, goal_id: i64) -> Result<GoalPrediction> {
    let row: Option<PredictionRow> = conn
        .query_row(
            "SELECT id, predicted_completion_date, confidence_score, recommended_monthly_amount,
                    minimum_monthly_amount, monthly_projections, ai_insights, risk_factors,
                    opportunities, model_version, prediction_factors, created_at
             FROM goal_predictions
             WHERE goal_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT 1",
            [goal_id],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                    row.get(10)?,
                    row.get(11)?,
                ))
            },
        )
        .optional()?;

    let (id, date, confidence, recommended, minimum, projections, insights, risks, opportunities, model_version, factors, created_at) =
        row.ok_or_else(|| {
            anyhow::anyhow!("Goal {} has no stored prediction. Run a prediction through the API first.", goal_id)
        })?;

    Ok(GoalPrediction {
        id,
        goal_id,
        predicted_completion_date: date,
        confidence_score: confidence,
        recommended_monthly_amount: recommended,
        minimum_monthly_amount: minimum,
        monthly_projections: serde_json::from_str(&projections)?,
        ai_insights: serde_json::from_str(&insights)?,
        risk_factors: serde_json::from_str(&risks)?,
        opportunities: serde_json::from_str(&opportunities)?,
        model_version,
        prediction_factors: serde_json::from_str(&factors)?,
        created_at,
    })
}
