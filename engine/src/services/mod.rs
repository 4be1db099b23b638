pub mod feed_coordinator;
pub mod rsi_service;
pub mod sink;

pub use feed_coordinator::{FeedCoordinator, SessionEnd, StartupReport};
pub use rsi_service::{AlertThresholds, RsiService, TickOutcome};
pub use sink::{ChannelSink, ObservationSink, SinkEvent, TracingSink};
