mod config;
mod error;
mod exchange;
mod health;
mod logger;
mod models;
mod notifier;
mod telegram;
mod trader;
mod utils;

use anyhow::Result;
use teloxide::Bot;

use crate::exchange::{Delta, Exchange, delta::DEFAULT_BASE_URL};

#[tokio::main]
async fn main() -> Result<()> {
    // 1) .env, config, logger
    dotenv::dotenv().ok();
    let cfg = config::Config::load()?;
    logger::init(&cfg);

    // 2) Telegram bot
    let bot = Bot::new(&cfg.telegram_token);

    // 3) Exchange client + ping
    let base_url = cfg.delta_base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
    let mut exchange = Delta::new(&cfg.delta_api_key, &cfg.delta_api_secret, base_url)?;
    exchange.check_connection().await?;

    // 4) health-check listener for the hosting platform
    let port = cfg.listen_port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            tracing::error!("health listener failed: {}", e);
        }
    });

    // 5) dispatcher
    telegram::run(bot, exchange, cfg).await;
    Ok(())
}
