// Downstream outputs for readings and alerts. Presentation subscribes here and
// never touches symbol state.
use crate::services::rsi_service::AlertThresholds;
use shared::models::{RsiAlert, RsiReading};
use shared::utils::{format_price, format_rsi, RsiZone};
use tokio::sync::mpsc;

pub trait ObservationSink: Send {
    fn publish_reading(&mut self, reading: &RsiReading);
    fn publish_alert(&mut self, alert: &RsiAlert);
}

impl<S: ObservationSink + ?Sized> ObservationSink for Box<S> {
    fn publish_reading(&mut self, reading: &RsiReading) {
        (**self).publish_reading(reading)
    }

    fn publish_alert(&mut self, alert: &RsiAlert) {
        (**self).publish_alert(alert)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    thresholds: AlertThresholds,
}

impl TracingSink {
    pub fn new(thresholds: AlertThresholds) -> Self {
        TracingSink { thresholds }
    }
}

impl ObservationSink for TracingSink {
    fn publish_reading(&mut self, reading: &RsiReading) {
        let zone = RsiZone::classify(reading.rsi, self.thresholds.upper, self.thresholds.lower);
        if reading.committed {
            tracing::info!(
                symbol = %reading.symbol,
                rsi = %format_rsi(reading.rsi),
                price = %format_price(reading.price),
                zone = zone.as_str(),
                "Candle closed"
            );
        } else {
            tracing::debug!(
                symbol = %reading.symbol,
                rsi = %format_rsi(reading.rsi),
                price = %format_price(reading.price),
                zone = zone.as_str(),
                "RSI tick"
            );
        }
    }

    fn publish_alert(&mut self, alert: &RsiAlert) {
        tracing::warn!(
            symbol = %alert.symbol,
            direction = %alert.direction,
            previous_rsi = %format_rsi(alert.previous_rsi),
            current_rsi = %format_rsi(alert.current_rsi),
            "RSI threshold cross"
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Reading(RsiReading),
    Alert(RsiAlert),
}

// Forwards everything over an unbounded channel. A closed receiver is
// ignored; the engine keeps running without a subscriber.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelSink { tx }, rx)
    }
}

impl ObservationSink for ChannelSink {
    fn publish_reading(&mut self, reading: &RsiReading) {
        let _ = self.tx.send(SinkEvent::Reading(reading.clone()));
    }

    fn publish_alert(&mut self, alert: &RsiAlert) {
        let _ = self.tx.send(SinkEvent::Alert(alert.clone()));
    }
}
