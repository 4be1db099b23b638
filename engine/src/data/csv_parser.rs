// Historical candles from local CSV files, one file per symbol.
use crate::data::history::HistoryProvider;
use crate::error::EngineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use shared::models::{Candle, TimeFrame};
use std::path::PathBuf;

pub struct CandleCsvParser;

impl CandleCsvParser {
    // CSV Header: open_time,open,high,low,close,volume,trades
    // Example Row: 1700000000000,37100.5,37150.0,37080.1,37120.9,152.33,1840
    // open_time is epoch millis; close_time is not stored and is taken as open_time.
    pub fn parse_candles(raw: &str, symbol: &str) -> Result<Vec<Candle>, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(raw.as_bytes());

        let headers = rdr.headers()?.clone();
        let mut candles = Vec::new();

        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;

            let open_time = Self::required(&record, &headers, symbol, "open_time", line)?
                .parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .ok_or_else(|| Self::bad_field(symbol, "open_time", line))?;

            let decimal = |name: &str| -> Result<f64, EngineError> {
                Self::required(&record, &headers, symbol, name, line)?
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| Self::bad_field(symbol, name, line))
            };

            let open = decimal("open")?;
            let high = decimal("high")?;
            let low = decimal("low")?;
            let close = decimal("close")?;
            let volume = Self::get_field(&record, &headers, "volume")
                .map(|v| v.parse::<f64>().map_err(|_| Self::bad_field(symbol, "volume", line)))
                .transpose()?
                .unwrap_or(0.0);
            let trades = Self::get_field(&record, &headers, "trades")
                .map(|v| v.parse::<u32>().map_err(|_| Self::bad_field(symbol, "trades", line)))
                .transpose()?
                .unwrap_or(0);

            candles.push(Candle {
                symbol: symbol.to_string(),
                timestamp: open_time,
                close_time: open_time,
                open,
                high,
                low,
                close,
                volume,
                trades,
            });
        }
        Ok(candles)
    }

    fn get_field<'a>(record: &'a StringRecord, headers: &StringRecord, name: &str) -> Option<&'a str> {
        headers
            .iter()
            .position(|header| header == name)
            .and_then(|pos| record.get(pos))
    }

    fn required<'a>(
        record: &'a StringRecord,
        headers: &StringRecord,
        symbol: &str,
        name: &str,
        line: usize,
    ) -> Result<&'a str, EngineError> {
        Self::get_field(record, headers, name)
            .ok_or_else(|| EngineError::history_fetch(symbol, format!("missing '{}' field at line {}", name, line)))
    }

    fn bad_field(symbol: &str, name: &str, line: usize) -> EngineError {
        EngineError::history_fetch(symbol, format!("invalid '{}' at line {}", name, line))
    }
}

// Reads {dir}/{SYMBOL}.csv. The interval is not encoded in the file, so the
// directory is expected to hold candles of the configured interval.
pub struct CsvHistory {
    dir: PathBuf,
}

impl CsvHistory {
    pub fn new(dir: PathBuf) -> Self {
        CsvHistory { dir }
    }
}

#[async_trait]
impl HistoryProvider for CsvHistory {
    async fn fetch_candles(&self, symbol: &str, interval: TimeFrame, count: usize) -> Result<Vec<Candle>, EngineError> {
        let path = self.dir.join(format!("{}.csv", symbol));
        tracing::debug!(%symbol, %interval, path = %path.display(), "Reading candles from CSV");

        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| EngineError::history_fetch(symbol, format!("{}: {}", path.display(), e)))?;

        let mut candles = CandleCsvParser::parse_candles(&raw, symbol).map_err(|e| match e {
            EngineError::HistoryFetch { .. } => e,
            other => EngineError::history_fetch(symbol, other),
        })?;
        candles.sort_by_key(|c| c.timestamp);

        let skip = candles.len().saturating_sub(count);
        Ok(candles.split_off(skip))
    }
}
