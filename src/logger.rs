// src/logger.rs

use crate::config::Config;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;

/// Tracing initialization; RUST_LOG wins, INFO otherwise.
pub fn init(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::info!("Logger initialized. Underlying = {}", cfg.underlying);
}
