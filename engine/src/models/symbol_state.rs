use crate::indicators::WilderAverages;
use shared::models::AlertDirection;
use std::collections::VecDeque;

// Per-symbol price window and smoothing state.
//
// `averages` is `None` until the initializer has run; the RSI pair only
// moves together and only on a committed update.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolState {
    symbol: String,
    capacity: usize,
    price_history: VecDeque<f64>,
    averages: Option<WilderAverages>,
    current_rsi: f64,
    previous_rsi: f64,
    alert_state: Option<AlertDirection>,
}

impl SymbolState {
    pub fn new(symbol: &str, capacity: usize) -> Self {
        SymbolState {
            symbol: symbol.to_string(),
            capacity,
            price_history: VecDeque::with_capacity(capacity + 1),
            averages: None,
            current_rsi: 0.0,
            previous_rsi: 0.0,
            alert_state: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_initialized(&self) -> bool {
        self.averages.is_some()
    }

    pub fn price_history(&self) -> &VecDeque<f64> {
        &self.price_history
    }

    pub fn last_close(&self) -> Option<f64> {
        self.price_history.back().copied()
    }

    pub fn averages(&self) -> Option<WilderAverages> {
        self.averages
    }

    pub fn current_rsi(&self) -> f64 {
        self.current_rsi
    }

    pub fn previous_rsi(&self) -> f64 {
        self.previous_rsi
    }

    pub fn alert_state(&self) -> Option<AlertDirection> {
        self.alert_state
    }

    // Replaces the whole state with freshly seeded values. Only the last
    // `capacity` closes are kept.
    pub(crate) fn seed(&mut self, closes: &[f64], averages: WilderAverages, rsi: f64) {
        let skip = closes.len().saturating_sub(self.capacity);
        self.price_history.clear();
        self.price_history.extend(closes[skip..].iter().copied());
        self.averages = Some(averages);
        self.current_rsi = rsi;
        self.previous_rsi = rsi;
        self.alert_state = None;
    }

    pub(crate) fn commit(&mut self, price: f64, averages: WilderAverages, rsi: f64) {
        self.previous_rsi = self.current_rsi;
        self.current_rsi = rsi;
        self.averages = Some(averages);
        self.price_history.push_back(price);
        while self.price_history.len() > self.capacity {
            self.price_history.pop_front();
        }
    }

    pub(crate) fn set_alert_state(&mut self, direction: AlertDirection) {
        self.alert_state = Some(direction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn avgs() -> WilderAverages {
        WilderAverages { avg_gain: 1.0, avg_loss: 1.0 }
    }

    #[test]
    fn test_new_state_is_blank() {
        let state = SymbolState::new("BTCUSDT", 5);
        assert!(!state.is_initialized());
        assert!(state.price_history().is_empty());
        assert_eq!(state.last_close(), None);
        assert_eq!(state.alert_state(), None);
    }

    #[test]
    fn test_seed_trims_to_capacity() {
        let mut state = SymbolState::new("BTCUSDT", 3);
        state.seed(&[1.0, 2.0, 3.0, 4.0, 5.0], avgs(), 55.0);
        assert_eq!(state.price_history().iter().copied().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(state.current_rsi(), 55.0);
        assert_eq!(state.previous_rsi(), 55.0);
    }

    #[test]
    fn test_commit_evicts_oldest_and_shifts_rsi() {
        let mut state = SymbolState::new("BTCUSDT", 3);
        state.seed(&[1.0, 2.0, 3.0], avgs(), 40.0);
        state.commit(4.0, avgs(), 45.0);
        assert_eq!(state.price_history().len(), 3);
        assert_eq!(state.price_history().front(), Some(&2.0));
        assert_eq!(state.last_close(), Some(4.0));
        assert_eq!(state.previous_rsi(), 40.0);
        assert_eq!(state.current_rsi(), 45.0);
    }
}
