use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insufficient history for '{symbol}': need at least {needed} closes, got {got}")]
    InsufficientHistory {
        symbol: String,
        needed: usize,
        got: usize,
    },

    #[error("History fetch failed for '{symbol}': {reason}")]
    HistoryFetch { symbol: String, reason: String },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Live feed error: {0}")]
    Feed(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl EngineError {
    pub fn history_fetch(symbol: &str, reason: impl std::fmt::Display) -> Self {
        EngineError::HistoryFetch {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}
