use std::sync::Arc;

use tokio::signal;
use tracing::{error, info, warn};

use rackwatch::adapter::http::SourceClient;
#[cfg(feature = "telegram")]
use rackwatch::adapter::telegram::{TelegramConfig, TelegramSender};
use rackwatch::app::{
    DiffEngine, NotificationDispatcher, PriceCache, StockMonitor, SubscriptionStore,
};
use rackwatch::config::Config;
use rackwatch::port::{AlertSink, TracingSink};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match Config::load("config.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    config.logging.init();
    info!("rackwatch starting");

    let sink = alert_sink();
    let source = Arc::new(SourceClient::from_config(&config.source));
    let store = Arc::new(SubscriptionStore::new());
    let cache = Arc::new(PriceCache::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(sink));
    let engine = Arc::new(DiffEngine::new(
        store.clone(),
        source.clone(),
        source,
        cache,
        dispatcher.clone(),
    ));
    let monitor = StockMonitor::new(store.clone(), engine, dispatcher);

    for spec in config.subscriptions {
        store.add(spec);
    }
    if let Err(e) = monitor.set_check_interval(config.monitor.check_interval_secs) {
        // config validation already floors the interval
        warn!(error = %e, "keeping default check interval");
    }

    if let Err(e) = monitor.start() {
        error!(error = %e, "failed to start monitor");
        std::process::exit(1);
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!(error = %e, "failed to listen for shutdown signal"),
    }

    if let Err(e) = monitor.stop().await {
        warn!(error = %e, "monitor was not running");
    }

    info!("rackwatch stopped");
}

#[cfg(feature = "telegram")]
fn alert_sink() -> Arc<dyn AlertSink> {
    match TelegramConfig::from_env() {
        Some(config) => {
            info!(chat_id = config.chat_id, "telegram delivery enabled");
            Arc::new(TelegramSender::new(&config))
        }
        None => {
            info!("telegram credentials absent, logging alerts only");
            Arc::new(TracingSink)
        }
    }
}

#[cfg(not(feature = "telegram"))]
fn alert_sink() -> Arc<dyn AlertSink> {
    info!("telegram delivery compiled out, logging alerts only");
    Arc::new(TracingSink)
}
