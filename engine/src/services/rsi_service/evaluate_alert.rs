// Threshold-cross classification on committed RSI values.
use crate::models::SymbolState;
use shared::models::{AlertDirection, RsiAlert};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    pub upper: f64,
    pub lower: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds { upper: 70.0, lower: 30.0 }
    }
}

// Bearish when RSI leaves the overbought zone, bullish when it leaves the
// oversold zone. Anything else, including a return to neutral, is no event.
pub fn classify_cross(previous: f64, current: f64, thresholds: &AlertThresholds) -> Option<AlertDirection> {
    if previous >= thresholds.upper && current < thresholds.upper {
        Some(AlertDirection::Bearish)
    } else if previous <= thresholds.lower && current > thresholds.lower {
        Some(AlertDirection::Bullish)
    } else {
        None
    }
}

// Runs after a commit. Records the classification on the state.
pub(super) fn evaluate_commit(state: &mut SymbolState, thresholds: &AlertThresholds) -> Option<RsiAlert> {
    let (previous, current) = (state.previous_rsi(), state.current_rsi());
    let direction = classify_cross(previous, current, thresholds)?;
    state.set_alert_state(direction);
    Some(RsiAlert {
        symbol: state.symbol().to_string(),
        direction,
        previous_rsi: previous,
        current_rsi: current,
    })
}
