// Historical klines from the Binance spot REST API.
use crate::data::history::HistoryProvider;
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use shared::models::{Candle, TimeFrame};
use std::time::Duration;

pub struct BinanceRestHistory {
    client: Client,
    base_url: String,
}

impl BinanceRestHistory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(BinanceRestHistory {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HistoryProvider for BinanceRestHistory {
    async fn fetch_candles(&self, symbol: &str, interval: TimeFrame, count: usize) -> Result<Vec<Candle>, EngineError> {
        let url = format!("{}/klines", self.base_url);
        tracing::debug!(%symbol, %interval, count, "Fetching klines");

        // One extra row: the newest kline is usually still open and gets dropped.

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_string()),
                ("interval", interval.label().to_string()),
                ("limit", (count + 1).to_string()),
            ])
            .send()
            .await
            .map_err(|e| EngineError::history_fetch(symbol, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::history_fetch(symbol, format!("HTTP {}: {}", status, body)));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| EngineError::history_fetch(symbol, e))?;

        let candles = parse_klines(symbol, &rows)?;
        Ok(closed_candles(candles, Utc::now(), count))
    }
}

// Binance kline layout:
// [openTime, open, high, low, close, volume, closeTime, quoteVolume, trades, ...]
pub fn parse_klines(symbol: &str, rows: &[Vec<Value>]) -> Result<Vec<Candle>, EngineError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            parse_kline_row(symbol, row)
                .ok_or_else(|| EngineError::history_fetch(symbol, format!("malformed kline at row {}", idx)))
        })
        .collect()
}

fn parse_kline_row(symbol: &str, row: &[Value]) -> Option<Candle> {
    let millis = |i: usize| row.get(i)?.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis);
    let decimal = |i: usize| {
        row.get(i)?
            .as_str()?
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    };

    Some(Candle {
        symbol: symbol.to_string(),
        timestamp: millis(0)?,
        open: decimal(1)?,
        high: decimal(2)?,
        low: decimal(3)?,
        close: decimal(4)?,
        volume: decimal(5)?,
        close_time: millis(6)?,
        trades: row.get(8).and_then(Value::as_u64).unwrap_or(0) as u32,
    })
}

// Drops the still-forming last candle, then keeps the newest `count`.
fn closed_candles(mut candles: Vec<Candle>, now: DateTime<Utc>, count: usize) -> Vec<Candle> {
    if candles.last().map_or(false, |c| c.close_time > now) {
        candles.pop();
    }
    let skip = candles.len().saturating_sub(count);
    candles.split_off(skip)
}
