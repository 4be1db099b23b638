// Engine main entry point
use engine::config::settings::EngineSettings;
use engine::data::binance_stream::BinanceKlineFeed;
use engine::data::history::provider_from_settings;
use engine::services::{FeedCoordinator, RsiService, TracingSink};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    info!("Starting RSI engine...");

    let config_path = std::env::args().nth(1);
    let settings = EngineSettings::load(config_path.as_deref())?;
    info!(
        symbols = ?settings.symbols,
        interval = %settings.interval,
        period = settings.rsi_period,
        "Engine settings loaded"
    );

    let history = provider_from_settings(&settings)?;
    let feed = BinanceKlineFeed::new(&settings.ws_base_url);
    let sink = TracingSink::new(RsiService::from_settings(&settings).thresholds());

    let mut coordinator = FeedCoordinator::new(settings, history, feed, sink);
    coordinator.run().await;

    Ok(())
}
