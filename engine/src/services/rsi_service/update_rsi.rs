// Folds one live price into a symbol's state.
use crate::indicators::gain_loss;
use crate::models::SymbolState;

// Returns the candidate RSI for `price`, diffed against the last committed
// close and smoothed once against the last committed averages.
//
// Only a commit stores the candidate; a provisional tick leaves `state`
// untouched. `None` when the state has not been seeded.
pub fn apply_tick(state: &mut SymbolState, price: f64, is_commit: bool, period: usize) -> Option<f64> {
    let last_close = state.last_close()?;
    let committed = state.averages()?;

    let (gain, loss) = gain_loss(price - last_close);
    let candidate = committed.smoothed(gain, loss, period);
    let rsi = candidate.rsi();

    if is_commit {
        state.commit(price, candidate, rsi);
        tracing::debug!(symbol = %state.symbol(), price, rsi, "Committed closed candle");
    } else {
        tracing::trace!(symbol = %state.symbol(), price, rsi, "Provisional tick");
    }
    Some(rsi)
}
