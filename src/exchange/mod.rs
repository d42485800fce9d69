pub mod delta;
pub mod types;

pub use delta::Delta;
pub use types::*;

use crate::error::TradeError;
use crate::models::OrderRequest;
use async_trait::async_trait;

/// Seam between the bot and the venue. One implementation talks to
/// Delta Exchange; tests substitute a mock.
#[async_trait]
pub trait Exchange {
    async fn check_connection(&mut self) -> Result<(), TradeError>;
    async fn get_spot_price(&self, symbol: &str) -> Result<rust_decimal::Decimal, TradeError>;
    async fn list_expiries(&self, underlying: &str) -> Result<Vec<Expiry>, TradeError>;
    async fn get_option_chain(&self, underlying: &str, expiry: Expiry) -> Result<OptionChain, TradeError>;
    async fn place_market_order(&self, request: &OrderRequest) -> Result<Order, TradeError>;
    async fn get_positions(&self) -> Result<Vec<Position>, TradeError>;
}
