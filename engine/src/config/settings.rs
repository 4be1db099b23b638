// Engine settings, loaded once at startup from an optional JSON file.
use crate::error::EngineError;
use serde::Deserialize;
use shared::models::TimeFrame;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "RSI_ENGINE_CONFIG";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    Binance,
    CsvDir(PathBuf),
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineSettings {
    pub symbols: Vec<String>,
    pub interval: TimeFrame,
    pub rsi_period: usize,
    // Maximum number of closed-candle prices kept per symbol.
    pub history_limit: usize,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    pub reconnect_delay_secs: u64,
    pub request_timeout_secs: u64,
    pub rest_base_url: String,
    pub ws_base_url: String,
    pub history_source: HistorySource,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            symbols: ["BTCUSDT", "ETHUSDT", "ADAUSDT", "SOLUSDT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            interval: TimeFrame::Minute5,
            rsi_period: 14,
            history_limit: 100,
            upper_threshold: 70.0,
            lower_threshold: 30.0,
            reconnect_delay_secs: 5,
            request_timeout_secs: 10,
            rest_base_url: "https://api.binance.com/api/v3".to_string(),
            ws_base_url: "wss://stream.binance.com:9443/ws".to_string(),
            history_source: HistorySource::Binance,
        }
    }
}

impl EngineSettings {
    pub fn from_json_str(raw: &str) -> Result<Self, EngineError> {
        let mut settings: EngineSettings = serde_json::from_str(raw)?;
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    // Reads the file named by `path`, or by `RSI_ENGINE_CONFIG` when no
    // path is given. Falls back to defaults when neither is set.
    pub fn load(path: Option<&str>) -> Result<Self, EngineError> {
        let from_env = std::env::var(CONFIG_ENV_VAR).ok();
        match path.map(str::to_string).or(from_env) {
            Some(p) => {
                tracing::info!(path = %p, "Loading engine settings");
                Self::from_file(p)
            }
            None => {
                tracing::info!("No settings file given, using defaults");
                let mut settings = Self::default();
                settings.normalize();
                settings.validate()?;
                Ok(settings)
            }
        }
    }

    fn normalize(&mut self) {
        for symbol in self.symbols.iter_mut() {
            *symbol = symbol.trim().to_uppercase();
        }
        let mut seen = HashSet::new();
        self.symbols.retain(|s| seen.insert(s.clone()));
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.symbols.is_empty() || self.symbols.iter().any(|s| s.is_empty()) {
            return Err(EngineError::Config("at least one non-empty symbol is required".to_string()));
        }
        if self.rsi_period == 0 {
            return Err(EngineError::Config("rsi_period must be greater than 0".to_string()));
        }
        if self.history_limit < self.rsi_period + 1 {
            return Err(EngineError::Config(format!(
                "history_limit ({}) must be at least rsi_period + 1 ({})",
                self.history_limit,
                self.rsi_period + 1
            )));
        }
        let in_range = |v: f64| v > 0.0 && v < 100.0;
        if !in_range(self.upper_threshold) || !in_range(self.lower_threshold) {
            return Err(EngineError::Config("alert thresholds must lie strictly between 0 and 100".to_string()));
        }
        if self.lower_threshold >= self.upper_threshold {
            return Err(EngineError::Config(format!(
                "lower_threshold ({}) must be below upper_threshold ({})",
                self.lower_threshold, self.upper_threshold
            )));
        }
        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
