// Drives startup and steady state: seed every symbol from history, then fold
// live ticks in until the feed drops, and start over after a fixed delay.
use crate::config::settings::EngineSettings;
use crate::data::history::HistoryProvider;
use crate::data::live_feed::LiveFeed;
use crate::data::symbol_store::SymbolStateStore;
use crate::error::EngineError;
use crate::services::rsi_service::{RsiService, TickOutcome};
use crate::services::sink::ObservationSink;
use futures::StreamExt;
use shared::models::{FeedEvent, RsiReading};
use tracing::{error, info, warn};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StartupReport {
    pub initialized: Vec<String>,
    pub failed: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    SubscribeFailed(String),
    Disconnected(String),
    StreamEnded,
}

pub struct FeedCoordinator<H, F, S> {
    settings: EngineSettings,
    rsi: RsiService,
    store: SymbolStateStore,
    history: H,
    feed: F,
    sink: S,
}

impl<H, F, S> FeedCoordinator<H, F, S>
where
    H: HistoryProvider,
    F: LiveFeed,
    S: ObservationSink,
{
    pub fn new(settings: EngineSettings, history: H, feed: F, sink: S) -> Self {
        let rsi = RsiService::from_settings(&settings);
        FeedCoordinator {
            settings,
            rsi,
            store: SymbolStateStore::new(),
            history,
            feed,
            sink,
        }
    }

    pub fn store(&self) -> &SymbolStateStore {
        &self.store
    }

    // Resets every symbol and seeds each one independently. A failure for one
    // symbol leaves it uninitialized and does not affect the others.
    pub async fn start_up(&mut self) -> StartupReport {
        self.store
            .initialize_all(&self.settings.symbols, self.settings.history_limit);

        let mut report = StartupReport::default();
        let symbols = self.settings.symbols.clone();
        for symbol in symbols {
            match self.initialize_symbol(&symbol).await {
                Ok(()) => report.initialized.push(symbol),
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "Failed to initialize symbol");
                    report.failed.push((symbol, e.to_string()));
                }
            }
        }
        info!(
            initialized = report.initialized.len(),
            failed = report.failed.len(),
            "Startup complete"
        );
        report
    }

    async fn initialize_symbol(&mut self, symbol: &str) -> Result<(), EngineError> {
        let candles = self
            .history
            .fetch_candles(symbol, self.settings.interval, self.settings.history_limit)
            .await?;
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

        let rsi = self.rsi.initialize(&mut self.store, symbol, &closes)?;
        if let Some(price) = closes.last() {
            self.sink.publish_reading(&RsiReading {
                symbol: symbol.to_string(),
                rsi,
                price: *price,
                committed: true,
            });
        }
        Ok(())
    }

    // Processes one feed event. Returns the outcome for ticks that produced a
    // reading; dropped or not-yet-seeded ticks return `None`.
    pub fn handle_event(&mut self, event: &FeedEvent) -> Option<TickOutcome> {
        let tick = match event {
            FeedEvent::Tick(tick) => tick,
            FeedEvent::Disconnected { .. } => return None,
        };

        match self.rsi.update(&mut self.store, tick) {
            Ok(Some(outcome)) => {
                self.sink.publish_reading(&outcome.reading);
                if let Some(alert) = &outcome.alert {
                    self.sink.publish_alert(alert);
                }
                Some(outcome)
            }
            Ok(None) => {
                tracing::debug!(symbol = %tick.symbol, "Tick ignored, symbol not initialized");
                None
            }
            Err(e) => {
                warn!(symbol = %tick.symbol, error = %e, "Dropping observation");
                None
            }
        }
    }

    pub async fn run_session(&mut self) -> SessionEnd {
        self.start_up().await;

        let mut stream = match self
            .feed
            .subscribe(&self.settings.symbols, self.settings.interval)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, "Live feed subscription failed");
                return SessionEnd::SubscribeFailed(e.to_string());
            }
        };

        while let Some(event) = stream.next().await {
            if let FeedEvent::Disconnected { reason } = &event {
                warn!(%reason, "Live feed disconnected");
                return SessionEnd::Disconnected(reason.clone());
            }
            self.handle_event(&event);
        }
        warn!("Live feed stream ended");
        SessionEnd::StreamEnded
    }

    pub async fn run(&mut self) {
        let delay = self.settings.reconnect_delay();
        loop {
            let end = self.run_session().await;
            info!(?end, delay_secs = delay.as_secs(), "Restarting after delay");
            tokio::time::sleep(delay).await;
        }
    }
}
