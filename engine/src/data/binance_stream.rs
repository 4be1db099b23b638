// Binance kline websocket feed.
use crate::data::live_feed::{FeedStream, LiveFeed};
use crate::error::EngineError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::models::{FeedEvent, TickObserved, TimeFrame};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Deserialize)]
struct RawKlineEvent {
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "k")]
    kline: RawKline,
}

#[derive(Debug, Deserialize)]
struct RawKline {
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "x")]
    is_closed: bool,
}

pub fn parse_kline_message(raw: &str) -> Result<TickObserved, EngineError> {
    let event: RawKlineEvent = serde_json::from_str(raw)?;
    let price = event
        .kline
        .close
        .parse::<f64>()
        .map_err(|e| EngineError::Feed(format!("invalid close price '{}': {}", event.kline.close, e)))?;
    if !price.is_finite() {
        return Err(EngineError::Feed(format!("non-finite close price '{}'", event.kline.close)));
    }
    Ok(TickObserved {
        symbol: event.symbol.to_uppercase(),
        price,
        is_commit: event.kline.is_closed,
    })
}

// {base}/btcusdt@kline_5m/ethusdt@kline_5m
pub fn stream_url(base: &str, symbols: &[String], interval: TimeFrame) -> String {
    let streams: Vec<String> = symbols
        .iter()
        .map(|s| format!("{}@kline_{}", s.to_lowercase(), interval.label()))
        .collect();
    format!("{}/{}", base.trim_end_matches('/'), streams.join("/"))
}

pub struct BinanceKlineFeed {
    base_url: String,
}

impl BinanceKlineFeed {
    pub fn new(base_url: &str) -> Self {
        BinanceKlineFeed {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl LiveFeed for BinanceKlineFeed {
    async fn subscribe(&self, symbols: &[String], interval: TimeFrame) -> Result<FeedStream, EngineError> {
        let url = stream_url(&self.base_url, symbols, interval);
        tracing::info!(%url, "Connecting to kline stream");

        let (ws, _) = connect_async(url.as_str())
            .await
            .map_err(|e| EngineError::Feed(format!("connect failed: {}", e)))?;
        let (mut write, mut read) = ws.split();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let reason = loop {
                match read.next().await {
                    Some(Ok(Message::Text(text))) => match parse_kline_message(&text) {
                        Ok(tick) => {
                            if tx.send(FeedEvent::Tick(tick)).await.is_err() {
                                // Coordinator dropped the stream.
                                return;
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "Skipping undecodable kline message"),
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        if let Err(e) = write.send(Message::Pong(payload)).await {
                            break format!("pong failed: {}", e);
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        break format!("closed by server: {:?}", frame);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break format!("read error: {}", e),
                    None => break "stream ended".to_string(),
                }
            };
            let _ = tx.send(FeedEvent::Disconnected { reason }).await;
        });

        Ok(ReceiverStream::new(rx).boxed())
    }
}
