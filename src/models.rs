// src/models.rs
use crate::error::TradeError;
use crate::exchange::types::{Expiry, OptionContract, Order, OrderSide};
use rust_decimal::Decimal;
use std::fmt;

/// Straddle direction chosen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Buy the ATM call and the ATM put.
    Long,
    /// Sell the ATM call and the ATM put.
    Short,
}

impl Strategy {
    pub fn order_side(self) -> OrderSide {
        match self {
            Strategy::Long => OrderSide::Buy,
            Strategy::Short => OrderSide::Sell,
        }
    }

    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "long" => Some(Strategy::Long),
            "short" => Some(Strategy::Short),
            _ => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Long => write!(f, "Long Straddle"),
            Strategy::Short => write!(f, "Short Straddle"),
        }
    }
}

/// A fully resolved order: the contract to trade, the side and the size.
/// Order type is always market; there is nothing else to choose.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub contract: OptionContract,
    pub side: OrderSide,
    pub size: u32,
}

impl OrderRequest {
    pub fn market(contract: &OptionContract, side: OrderSide, size: u32) -> Self {
        Self { contract: contract.clone(), side, size }
    }
}

/// Result of one expiry selection: spot, the resolved ATM strike and the
/// contracts listed at it. Lives in the chat dialog state until the user
/// confirms or cancels; never persisted.
#[derive(Debug, Clone)]
pub struct AtmSnapshot {
    pub expiry: Expiry,
    pub spot: Decimal,
    pub strike: Decimal,
    pub call: Option<OptionContract>,
    pub put: Option<OptionContract>,
}

impl AtmSnapshot {
    /// Both legs, or `None` when the venue lists only one side at the
    /// ATM strike (nothing tradeable as a straddle).
    pub fn legs(&self) -> Option<(&OptionContract, &OptionContract)> {
        match (&self.call, &self.put) {
            (Some(call), Some(put)) => Some((call, put)),
            _ => None,
        }
    }
}

/// Per-leg outcome of a straddle execution. A failed call leg does not
/// suppress the put leg's result; the user sees both.
#[derive(Debug)]
pub struct StraddleReport {
    pub strategy: Strategy,
    pub lot_size: u32,
    pub call: Result<Order, TradeError>,
    pub put: Result<Order, TradeError>,
}

impl StraddleReport {
    pub fn all_filled(&self) -> bool {
        self.call.is_ok() && self.put.is_ok()
    }
}
