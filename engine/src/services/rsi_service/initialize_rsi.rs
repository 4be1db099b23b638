// Seeds a symbol's averages and RSI from a batch of historical closes.
use crate::error::EngineError;
use crate::indicators::WilderAverages;
use crate::models::SymbolState;

pub fn initialize_symbol(state: &mut SymbolState, closes: &[f64], period: usize) -> Result<f64, EngineError> {
    let averages = WilderAverages::seed(closes, period).ok_or_else(|| EngineError::InsufficientHistory {
        symbol: state.symbol().to_string(),
        needed: period + 1,
        got: closes.len(),
    })?;
    let rsi = averages.rsi();

    state.seed(closes, averages, rsi);
    tracing::debug!(
        symbol = %state.symbol(),
        closes = closes.len(),
        avg_gain = averages.avg_gain,
        avg_loss = averages.avg_loss,
        rsi,
        "Initialized RSI state"
    );
    Ok(rsi)
}
