use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataConfig,
    pub models: ModelConfig,
    pub thresholds: ThresholdConfig,
    pub dry_run: bool,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct DataConfig {
    pub symbol: String,
    pub vix_symbol: String,
    pub period: String,
    pub use_mock_data: bool,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_dir: PathBuf,
    pub classifier_file: String,
    pub regime_file: String,
    pub scaler_file: String,
}

impl ModelConfig {
    pub fn classifier_path(&self) -> PathBuf {
        self.model_dir.join(&self.classifier_file)
    }

    pub fn regime_path(&self) -> PathBuf {
        self.model_dir.join(&self.regime_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.model_dir.join(&self.scaler_file)
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    pub classifier: f64,
    pub regime: f64,
    pub vote: u32,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// Parse the boolean convention used across the agent's environment
/// variables: "1", "true" and "yes" (any case) are true.
pub fn parse_bool_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value lookup. `load()` wires this to the
    /// process environment; tests supply a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let classifier = get("THRESH_LGB", "0.60")
            .parse::<f64>()
            .context("THRESH_LGB must be a float")?;
        let regime = get("THRESH_LSTM", "0.65")
            .parse::<f64>()
            .context("THRESH_LSTM must be a float")?;
        let vote = get("THRESH_VOTE", "2")
            .parse::<u32>()
            .context("THRESH_VOTE must be a non-negative integer")?;

        Ok(Self {
            data: DataConfig {
                symbol: get("DATA_SYMBOL", "QQQ"),
                vix_symbol: get("VIX_SYMBOL", "^VIX"),
                period: get("DATA_PERIOD", "2y"),
                use_mock_data: parse_bool_flag(&get("USE_MOCK_DATA", "false")),
            },
            models: ModelConfig {
                model_dir: PathBuf::from(get("MODEL_DIR", "./models")),
                classifier_file: get("LGB_MODEL_FILE", "lgb_model.txt"),
                regime_file: get("LSTM_MODEL_FILE", "lstm_model.onnx"),
                scaler_file: get("SCALER_FILE", "scaler.json"),
            },
            thresholds: ThresholdConfig {
                classifier,
                regime,
                vote,
            },
            dry_run: parse_bool_flag(&get("DRY_RUN", "true")),
            logging: LoggingConfig {
                level: get("LOG_LEVEL", "info"),
            },
        })
    }
}
