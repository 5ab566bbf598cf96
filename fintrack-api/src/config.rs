use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub api_keys: Option<ApiKeysConfig>,
    pub cors: Option<CorsConfig>,
    pub server: Option<ServerConfig>,
    pub database: Option<DatabaseConfig>,
    pub narrative: Option<NarrativeConfig>,
    pub forecasting: Option<ForecastingConfig>,
    pub alerts: Option<AlertsConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_keys: None,
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            }),
            server: Some(ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            }),
            database: None,
            narrative: Some(NarrativeConfig::default()),
            forecasting: Some(ForecastingConfig::default()),
            alerts: Some(AlertsConfig::default()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiKeysConfig {
    pub claude_api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct NarrativeConfig {
    pub enabled: bool,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub retry_backoff_ms: u64,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "claude-sonnet-4-5-20250929".to_string(),
            max_tokens: 1024,
            timeout_secs: 20,
            retry_backoff_ms: 500,
        }
    }
}

impl NarrativeConfig {
    pub fn options(&self) -> fintrack_agents::NarrativeOptions {
        fintrack_agents::NarrativeOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout: std::time::Duration::from_secs(self.timeout_secs),
            retry_backoff: std::time::Duration::from_millis(self.retry_backoff_ms),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ForecastingConfig {
    /// Savings velocity assumed when a user has neither contributions nor surplus
    pub default_monthly_velocity: f64,
}

impl Default for ForecastingConfig {
    fn default() -> Self {
        Self {
            default_monthly_velocity: forecasting::predictor::DEFAULT_MONTHLY_VELOCITY,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AlertsConfig {
    /// Interval of the background budget sweep; disabled when unset
    pub sweep_interval_secs: Option<u64>,
}

impl ApiConfig {
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        Self::load_from(get_config_path())
    }

    pub fn load_from(config_path: PathBuf) -> Result<(Self, PathBuf), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, default_config_file()).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn narrative(&self) -> NarrativeConfig {
        self.narrative.clone().unwrap_or_default()
    }

    pub fn default_monthly_velocity(&self) -> f64 {
        self.forecasting
            .as_ref()
            .map(|f| f.default_monthly_velocity)
            .unwrap_or(forecasting::predictor::DEFAULT_MONTHLY_VELOCITY)
    }

    pub fn claude_api_key(&self) -> Option<&str> {
        self.api_keys
            .as_ref()
            .and_then(|keys| keys.claude_api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn sweep_interval(&self) -> Option<std::time::Duration> {
        self.alerts
            .as_ref()
            .and_then(|a| a.sweep_interval_secs)
            .filter(|secs| *secs > 0)
            .map(std::time::Duration::from_secs)
    }
}

/// Default settings as TOML, with the API key left as a commented placeholder.
fn default_config_file() -> String {
    let body = toml::to_string_pretty(&ApiConfig::default()).unwrap_or_default();
    format!(
        "[api_keys]\n# claude_api_key = \"your-claude-key\"\n\n# [database]\n# path = \"/path/to/db.sqlite\"\n\n# [alerts]\n# sweep_interval_secs = 3600\n\n{}",
        body
    )
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("fintrack").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fintrack").join("api.toml");

        let (config, written) = ApiConfig::load_from(path.clone()).unwrap();
        assert_eq!(written, path);
        assert!(path.exists());
        assert_eq!(config.server.as_ref().unwrap().port, 8080);
        assert!(config.claude_api_key().is_none());
        assert!(config.narrative().enabled);
        assert_eq!(config.default_monthly_velocity(), 100.0);
        assert!(config.sweep_interval().is_none());
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.toml");
        std::fs::write(
            &path,
            "[api_keys]\nclaude_api_key = \"sk-test\"\n\n[narrative]\nenabled = false\n\n[forecasting]\ndefault_monthly_velocity = 250.0\n\n[alerts]\nsweep_interval_secs = 60\n",
        )
        .unwrap();

        let (config, _) = ApiConfig::load_from(path).unwrap();
        assert_eq!(config.claude_api_key(), Some("sk-test"));
        let narrative = config.narrative();
        assert!(!narrative.enabled);
        assert_eq!(narrative.timeout_secs, 20);
        assert_eq!(config.default_monthly_velocity(), 250.0);
        assert_eq!(config.sweep_interval(), Some(std::time::Duration::from_secs(60)));
        assert!(config.server.is_none());
    }
}
