// RSI engine: seeds each symbol from history, folds live ticks in and
// classifies threshold crosses on committed candles.
mod evaluate_alert;
mod initialize_rsi;
mod update_rsi;

pub use evaluate_alert::{classify_cross, AlertThresholds};

use crate::config::settings::EngineSettings;
use crate::data::symbol_store::SymbolStateStore;
use crate::error::EngineError;
use shared::models::{RsiAlert, RsiReading, TickObserved};

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub reading: RsiReading,
    pub alert: Option<RsiAlert>,
}

#[derive(Debug, Clone, Copy)]
pub struct RsiService {
    period: usize,
    thresholds: AlertThresholds,
}

impl RsiService {
    pub fn new(period: usize, thresholds: AlertThresholds) -> Self {
        RsiService { period, thresholds }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(
            settings.rsi_period,
            AlertThresholds {
                upper: settings.upper_threshold,
                lower: settings.lower_threshold,
            },
        )
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn thresholds(&self) -> AlertThresholds {
        self.thresholds
    }

    // Seeds `symbol` from historical closes, oldest first. Returns the initial RSI.
    pub fn initialize(&self, store: &mut SymbolStateStore, symbol: &str, closes: &[f64]) -> Result<f64, EngineError> {
        let state = store.get_mut(symbol)?;
        initialize_rsi::initialize_symbol(state, closes, self.period)
    }

    // Applies one live observation. `Ok(None)` means the symbol has not been
    // seeded yet and there is nothing to diff against.
    pub fn update(
        &self,
        store: &mut SymbolStateStore,
        tick: &TickObserved,
    ) -> Result<Option<TickOutcome>, EngineError> {
        let state = store.get_mut(&tick.symbol)?;
        let rsi = match update_rsi::apply_tick(state, tick.price, tick.is_commit, self.period) {
            Some(rsi) => rsi,
            None => return Ok(None),
        };

        let alert = if tick.is_commit {
            evaluate_alert::evaluate_commit(state, &self.thresholds)
        } else {
            None
        };

        Ok(Some(TickOutcome {
            reading: RsiReading {
                symbol: tick.symbol.clone(),
                rsi,
                price: tick.price,
                committed: tick.is_commit,
            },
            alert,
        }))
    }
}
