use actix_cors::Cors;
use actix_web::{get, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use fintrack_agents::storage::SqliteAgentStorage;
use fintrack_agents::{ClaudeClient, GoalNarrativeAgent};
use fintrack_api::config::ApiConfig;
use fintrack_api::jobs::budget_alert_manager::BudgetAlertManager;
use fintrack_api::jobs::prediction_manager::PredictionManager;
use fintrack_api::{handlers, helpers, Database};
use forecasting::GoalCompletionPredictor;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

#[get("/health")]
async fn health(db: web::Data<Arc<Database>>) -> impl Responder {
    match db.async_connection.lock().await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "database": "connected"
        })),
        Err(_) => HttpResponse::InternalServerError().json(serde_json::json!({
            "status": "unhealthy",
            "database": "disconnected"
        })),
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,
}

fn build_narrator(config: &ApiConfig, db: &Database) -> Option<Arc<GoalNarrativeAgent>> {
    let narrative = config.narrative();
    if !narrative.enabled {
        tracing::info!("Goal narratives disabled in config");
        return None;
    }

    let Some(api_key) = config.claude_api_key() else {
        tracing::warn!("No Claude API key configured, predictions will have no narrative");
        return None;
    };

    match ClaudeClient::new(api_key) {
        Ok(client) => Some(Arc::new(GoalNarrativeAgent::new(
            Arc::new(client),
            Arc::new(SqliteAgentStorage::new(db.connection.clone())),
            narrative.options(),
        ))),
        Err(e) => {
            tracing::warn!("Failed to create Claude client: {}", e);
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = args.log_file_path {
        let log_path = std::path::Path::new(&log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("fintrack-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter.clone())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let (config, config_path) = ApiConfig::load().expect("Failed to load config");
    tracing::info!("Loaded config from {:?}", config_path);

    let db = helpers::database::initialize_database(&config).expect("Failed to initialize database");

    let (host, port) = if let Some(server_config) = &config.server {
        (server_config.host.clone(), server_config.port)
    } else {
        ("127.0.0.1".to_string(), 8080)
    };

    tracing::info!("Server will listen on {}:{}", host, port);

    let prediction_manager = Arc::new(PredictionManager::new(
        db.async_connection.clone(),
        GoalCompletionPredictor::new(config.default_monthly_velocity()),
        build_narrator(&config, &db),
    ));

    let alert_manager = Arc::new(BudgetAlertManager::new(db.async_connection.clone()));

    // Periodic alert sweep, only when configured
    if let Some(interval) = config.sweep_interval() {
        tracing::info!("Budget alert sweep every {}s", interval.as_secs());
        let sweep_manager = alert_manager.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);
            loop {
                interval.tick().await;
                if let Err(e) = sweep_manager.sweep(chrono::Utc::now()).await {
                    tracing::error!("Periodic alert sweep failed: {}", e);
                }
            }
        });
    }

    let server = HttpServer::new(move || {
        let cors = if let Some(cors_config) = &config.cors {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(prediction_manager.clone()))
            .app_data(web::Data::new(alert_manager.clone()))
            .service(health)
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
    });

    server.await
}
