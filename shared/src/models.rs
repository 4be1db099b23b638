use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub trades: u32,
}

// Candle interval, serialized with the exchange's label (`"5m"`, `"1h"`, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Day1,
}

impl TimeFrame {
    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Minute30 => "30m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Day1 => "1d",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// One price observation from the live feed. `is_commit` is true only when
// the source candle has closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickObserved {
    pub symbol: String,
    pub price: f64,
    pub is_commit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeedEvent {
    Tick(TickObserved),
    Disconnected { reason: String },
}

// RSI value published for presentation after every processed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiReading {
    pub symbol: String,
    pub rsi: f64,
    pub price: f64,
    pub committed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertDirection {
    // RSI fell back below the upper threshold.
    Bearish,
    // RSI rose back above the lower threshold.
    Bullish,
}

impl fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertDirection::Bearish => f.write_str("bearish"),
            AlertDirection::Bullish => f.write_str("bullish"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiAlert {
    pub symbol: String,
    pub direction: AlertDirection,
    pub previous_rsi: f64,
    pub current_rsi: f64,
}
