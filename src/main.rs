//! Curve Lend APY Alert Bot
//!
//! A Telegram bot that reports and alerts on crvUSD deposit APY
//! across Curve lending vaults.

use clap::Parser;
use curve_alert_bot::{
    bot::Bot, config::Config, feed::FeedClient, scheduler::Scheduler, store::SubscriptionStore,
    telegram::TelegramClient,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "curve-alert-bot")]
#[command(about = "Telegram alert bot for Curve Lend crvUSD deposit APY")]
struct Cli {
    /// Config file path (searched in default locations if omitted)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    tracing::info!("Starting Curve Lend alert bot");

    // A corrupt subscription file is fatal here: better to refuse to
    // start than to silently discard configured alerts.
    let store = Arc::new(SubscriptionStore::load(&config.storage.path)?);
    tracing::info!(
        "Loaded {} subscription(s) from {}",
        store.len(),
        config.storage.path
    );

    let feed = Arc::new(FeedClient::new(&config.feed.url, config.feed.timeout_secs)?);
    let telegram = TelegramClient::new(&config.telegram.bot_token)?;

    // Background alert checks
    let scheduler = Scheduler::new(
        feed.clone(),
        store.clone(),
        Arc::new(telegram.clone()),
        Duration::from_secs(config.scheduler.cycle_secs),
    );
    tokio::spawn(scheduler.run());

    // Foreground update polling
    let bot = Bot::new(telegram, feed, store);
    bot.run().await;

    Ok(())
}
