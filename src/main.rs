use std::sync::Arc;
use std::time::Duration;

use almanac::config::{Config, PriceSource};
use almanac::services::{HistoryService, IndicatorEngine, NyseCalendar, SeasonalAggregator};
use almanac::sources::{FinnhubClient, PriceHistoryProvider, YahooFinanceClient};
use almanac::{app, AppState};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "almanac=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());
    info!("Starting Almanac server on {}:{}", config.host, config.port);

    let timeout = Duration::from_secs(config.request_timeout_secs);
    let provider: Arc<dyn PriceHistoryProvider> = match (config.price_source, &config.finnhub_api_key)
    {
        (PriceSource::Finnhub, Some(api_key)) => {
            info!("Finnhub API key found, serving history from Finnhub");
            Arc::new(FinnhubClient::new(api_key.clone(), timeout)?)
        }
        _ => Arc::new(YahooFinanceClient::new(timeout)?),
    };

    let history = HistoryService::new(
        provider,
        Duration::from_secs(config.history_cache_ttl_secs),
    );

    let state = AppState {
        config: config.clone(),
        history: history.clone(),
        indicators: Arc::new(IndicatorEngine::default()),
        seasonal: Arc::new(SeasonalAggregator::new(Arc::new(NyseCalendar::new()))),
    };

    // Drop expired histories once a minute
    {
        let history = history.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(60)).await;
                history.purge_expired();
                debug!("Purged expired history cache entries");
            }
        });
    }

    // Start the server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Almanac server listening on {}", addr);

    axum::serve(listener, app(state)).await?;

    Ok(())
}
