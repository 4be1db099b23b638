// End-to-end coordinator tests with in-memory history and feed.
//
// Run with: cargo test -p engine --test coordinator_flow

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use tokio::time::Instant;

use engine::config::settings::EngineSettings;
use engine::data::history::HistoryProvider;
use engine::data::live_feed::{FeedStream, LiveFeed};
use engine::error::EngineError;
use engine::services::{ChannelSink, FeedCoordinator, SessionEnd, SinkEvent};
use shared::models::{AlertDirection, Candle, FeedEvent, TickObserved, TimeFrame};

// ============================================================================
// Helpers
// ============================================================================

struct ScriptedHistory {
    closes: HashMap<String, Result<Vec<f64>, String>>,
}

#[async_trait]
impl HistoryProvider for ScriptedHistory {
    async fn fetch_candles(
        &self,
        symbol: &str,
        _interval: TimeFrame,
        count: usize,
    ) -> Result<Vec<Candle>, EngineError> {
        match self.closes.get(symbol) {
            Some(Ok(closes)) => {
                let skip = closes.len().saturating_sub(count);
                Ok(closes[skip..].iter().map(|c| candle(symbol, *c)).collect())
            }
            Some(Err(reason)) => Err(EngineError::history_fetch(symbol, reason)),
            None => Err(EngineError::history_fetch(symbol, "no data")),
        }
    }
}

// Replays one scripted session per subscribe call, then refuses connections.
struct ScriptedFeed {
    sessions: Mutex<VecDeque<Vec<FeedEvent>>>,
    subscribed_at: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedFeed {
    fn new(sessions: Vec<Vec<FeedEvent>>) -> Self {
        ScriptedFeed {
            sessions: Mutex::new(sessions.into()),
            subscribed_at: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl LiveFeed for ScriptedFeed {
    async fn subscribe(
        &self,
        _symbols: &[String],
        _interval: TimeFrame,
    ) -> Result<FeedStream, EngineError> {
        self.subscribed_at.lock().unwrap().push(Instant::now());
        match self.sessions.lock().unwrap().pop_front() {
            Some(events) => Ok(futures::stream::iter(events).boxed()),
            None => Err(EngineError::Feed("connection refused".to_string())),
        }
    }
}

fn candle(symbol: &str, close: f64) -> Candle {
    let ts = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
    Candle {
        symbol: symbol.to_string(),
        timestamp: ts,
        close_time: ts,
        open: close,
        high: close,
        low: close,
        close,
        volume: 0.0,
        trades: 0,
    }
}

fn tick(symbol: &str, price: f64, is_commit: bool) -> FeedEvent {
    FeedEvent::Tick(TickObserved {
        symbol: symbol.to_string(),
        price,
        is_commit,
    })
}

fn settings(symbols: &[&str]) -> EngineSettings {
    EngineSettings {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        history_limit: 30,
        ..EngineSettings::default()
    }
}

fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

fn falling(n: usize) -> Vec<f64> {
    (0..n).map(|i| 200.0 - i as f64).collect()
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<SinkEvent>) -> Vec<SinkEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_startup_isolates_symbol_failures() {
    let history = ScriptedHistory {
        closes: HashMap::from([
            ("BTCUSDT".to_string(), Ok(rising(40))),
            ("ETHUSDT".to_string(), Err("timeout".to_string())),
            ("SOLUSDT".to_string(), Ok(rising(5))),
        ]),
    };
    let feed = ScriptedFeed::new(vec![]);
    let (sink, mut rx) = ChannelSink::new();
    let mut coordinator = FeedCoordinator::new(settings(&["BTCUSDT", "ETHUSDT", "SOLUSDT"]), history, feed, sink);

    let report = coordinator.start_up().await;
    assert_eq!(report.initialized, vec!["BTCUSDT".to_string()]);
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed[1].1.contains("Insufficient history"));

    let btc = coordinator.store().get("BTCUSDT").unwrap();
    assert!(btc.is_initialized());
    assert_eq!(btc.price_history().len(), 30);
    assert!(!coordinator.store().get("ETHUSDT").unwrap().is_initialized());

    // Initial reading published with the last historical close.
    match drain(&mut rx).as_slice() {
        [SinkEvent::Reading(r)] => {
            assert_eq!(r.symbol, "BTCUSDT");
            assert_eq!(r.rsi, 100.0);
            assert_eq!(r.price, 139.0);
        }
        other => panic!("unexpected sink events: {:?}", other),
    }
}

#[tokio::test]
async fn test_session_processes_ticks_and_alerts() {
    let history = ScriptedHistory {
        closes: HashMap::from([
            ("BTCUSDT".to_string(), Ok(rising(20))),
            ("ETHUSDT".to_string(), Ok(falling(20))),
        ]),
    };
    let feed = ScriptedFeed::new(vec![vec![
        tick("BTCUSDT", 60.0, false),
        tick("DOGEUSDT", 1.0, true),
        tick("BTCUSDT", 60.0, true),
        tick("ETHUSDT", 260.0, true),
        FeedEvent::Disconnected {
            reason: "closed by server".to_string(),
        },
        tick("BTCUSDT", 500.0, true),
    ]]);
    let (sink, mut rx) = ChannelSink::new();
    let mut coordinator = FeedCoordinator::new(settings(&["BTCUSDT", "ETHUSDT"]), history, feed, sink);

    let end = coordinator.run_session().await;
    assert_eq!(end, SessionEnd::Disconnected("closed by server".to_string()));

    let events = drain(&mut rx);
    let readings: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SinkEvent::Reading(r) => Some(r),
            _ => None,
        })
        .collect();
    // Two initial readings, one provisional, two commits. The unknown symbol
    // and everything after the disconnect are not processed.
    assert_eq!(readings.len(), 5);
    assert!(!readings[2].committed);
    assert_eq!(readings[2].rsi, readings[3].rsi);

    let alerts: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SinkEvent::Alert(a) => Some((a.symbol.as_str(), a.direction)),
            _ => None,
        })
        .collect();
    assert_eq!(
        alerts,
        vec![("BTCUSDT", AlertDirection::Bearish), ("ETHUSDT", AlertDirection::Bullish)]
    );

    let btc = coordinator.store().get("BTCUSDT").unwrap();
    assert_eq!(btc.last_close(), Some(60.0));
    assert_eq!(btc.previous_rsi(), 100.0);
    assert_eq!(btc.alert_state(), Some(AlertDirection::Bearish));
}

#[tokio::test]
async fn test_session_end_variants() {
    let history = ScriptedHistory {
        closes: HashMap::from([("BTCUSDT".to_string(), Ok(rising(20)))]),
    };
    let feed = ScriptedFeed::new(vec![vec![tick("BTCUSDT", 150.0, true)]]);
    let (sink, _rx) = ChannelSink::new();
    let mut coordinator = FeedCoordinator::new(settings(&["BTCUSDT"]), history, feed, sink);

    assert_eq!(coordinator.run_session().await, SessionEnd::StreamEnded);
    assert_eq!(coordinator.store().get("BTCUSDT").unwrap().last_close(), Some(150.0));

    // Restart re-seeds from history, discarding live commits.
    match coordinator.run_session().await {
        SessionEnd::SubscribeFailed(reason) => assert!(reason.contains("connection refused")),
        other => panic!("unexpected session end: {:?}", other),
    }
    assert_eq!(coordinator.store().get("BTCUSDT").unwrap().last_close(), Some(119.0));
}

#[tokio::test]
async fn test_ticks_for_uninitialized_symbol_are_ignored() {
    let history = ScriptedHistory {
        closes: HashMap::new(),
    };
    let feed = ScriptedFeed::new(vec![]);
    let (sink, mut rx) = ChannelSink::new();
    let mut coordinator = FeedCoordinator::new(settings(&["BTCUSDT"]), history, feed, sink);
    coordinator.start_up().await;

    assert_eq!(coordinator.handle_event(&tick("BTCUSDT", 10.0, true)), None);
    assert!(coordinator.store().get("BTCUSDT").unwrap().price_history().is_empty());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_run_restarts_after_fixed_delay() {
    let history = ScriptedHistory {
        closes: HashMap::from([("BTCUSDT".to_string(), Ok(rising(20)))]),
    };
    // Two sessions that drop (one explicitly, one by ending), then every
    // further subscribe is refused.
    let feed = ScriptedFeed::new(vec![
        vec![
            tick("BTCUSDT", 150.0, true),
            FeedEvent::Disconnected {
                reason: "reset".to_string(),
            },
        ],
        vec![tick("BTCUSDT", 90.0, false)],
    ]);
    let subscribed_at = Arc::clone(&feed.subscribed_at);
    let (sink, _rx) = ChannelSink::new();
    let settings = settings(&["BTCUSDT"]);
    let delay = settings.reconnect_delay();
    assert_eq!(delay, Duration::from_secs(5));
    let mut coordinator = FeedCoordinator::new(settings, history, feed, sink);

    let started = Instant::now();
    let result = tokio::time::timeout(Duration::from_secs(27), coordinator.run()).await;
    assert!(result.is_err(), "run() must never return");

    let calls = subscribed_at.lock().unwrap().clone();
    // Attempts at 0, 5, 10, 15, 20 and 25 seconds: two sessions, four refusals.
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0], started);
    for pair in calls.windows(2) {
        assert_eq!(pair[1] - pair[0], delay);
    }

    // Every restart re-seeds from history.
    assert_eq!(coordinator.store().get("BTCUSDT").unwrap().last_close(), Some(119.0));
}
