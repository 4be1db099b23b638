// Source of historical closed candles used to seed each symbol.
use crate::config::settings::{EngineSettings, HistorySource};
use crate::data::binance_rest::BinanceRestHistory;
use crate::data::csv_parser::CsvHistory;
use crate::error::EngineError;
use async_trait::async_trait;
use shared::models::{Candle, TimeFrame};

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    // Up to `count` most recent closed candles for `symbol`, oldest first.
    async fn fetch_candles(&self, symbol: &str, interval: TimeFrame, count: usize) -> Result<Vec<Candle>, EngineError>;
}

#[async_trait]
impl<T: HistoryProvider + ?Sized> HistoryProvider for Box<T> {
    async fn fetch_candles(&self, symbol: &str, interval: TimeFrame, count: usize) -> Result<Vec<Candle>, EngineError> {
        (**self).fetch_candles(symbol, interval, count).await
    }
}

pub fn provider_from_settings(settings: &EngineSettings) -> Result<Box<dyn HistoryProvider>, EngineError> {
    match &settings.history_source {
        HistorySource::Binance => Ok(Box::new(BinanceRestHistory::new(
            &settings.rest_base_url,
            settings.request_timeout(),
        )?)),
        HistorySource::CsvDir(dir) => Ok(Box::new(CsvHistory::new(dir.clone()))),
    }
}
