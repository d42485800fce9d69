// src/config.rs
use anyhow::Result;
use config::{Config as Loader, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    // Delta Exchange
    pub delta_api_key:    String,
    pub delta_api_secret: String,
    pub delta_base_url:   Option<String>,

    // Telegram
    pub telegram_token:   String,

    // Hosting health checks
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    // Trading surface
    #[serde(default = "default_underlying")]
    pub underlying: String,

    #[serde(default = "default_spot_symbol")]
    pub spot_symbol: String,

    #[serde(default = "default_max_lot_size")]
    pub max_lot_size: u32,
}

fn default_listen_port() -> u16 { 10_000 }
fn default_underlying() -> String { "BTC".to_string() }
fn default_spot_symbol() -> String { "BTCUSD".to_string() }
fn default_max_lot_size() -> u32 { 1_000 }

impl Config {
    pub fn load() -> Result<Self> {
        let file = env::var("STRADDLER_CONFIG").unwrap_or_else(|_| "Config.toml".into());
        let loader = Loader::builder()
            .add_source(File::with_name(&file).required(false))
            .add_source(Environment::with_prefix("STRADDLER").separator("__"))
            .build()?;
        Ok(loader.try_deserialize()?)
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            delta_api_key: "test-key".into(),
            delta_api_secret: "test-secret".into(),
            delta_base_url: None,
            telegram_token: "test-token".into(),
            listen_port: default_listen_port(),
            underlying: default_underlying(),
            spot_symbol: default_spot_symbol(),
            max_lot_size: default_max_lot_size(),
        }
    }
}
