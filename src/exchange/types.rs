// src/exchange/types.rs
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Contract side as the venue names it. Displayed the Indian way: CE/PE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractType {
    Call,
    Put,
}

impl ContractType {
    /// Venue wire name, e.g. in ticker rows.
    pub fn from_api(s: &str) -> Option<Self> {
        match s {
            "call_options" => Some(ContractType::Call),
            "put_options" => Some(ContractType::Put),
            _ => None,
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractType::Call => write!(f, "CE"),
            ContractType::Put => write!(f, "PE"),
        }
    }
}

/// Options series expiry. Wire format for queries and callback data is
/// `DD-MM-YYYY`; option symbols carry it as a `DDMMYY` suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Expiry(pub NaiveDate);

impl Expiry {
    /// Extract the expiry from a venue option symbol like
    /// `C-BTC-90000-310125`. Returns `None` for anything else.
    pub fn from_option_symbol(symbol: &str) -> Option<Self> {
        let suffix = symbol.split('-').nth(3)?;
        NaiveDate::parse_from_str(suffix, "%d%m%y").ok().map(Expiry)
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%d-%m-%Y"))
    }
}

impl FromStr for Expiry {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%d-%m-%Y").map(Expiry)
    }
}

/// One listed option contract of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionContract {
    pub symbol: String,
    pub product_id: i64,
    pub contract_type: ContractType,
    pub strike: Decimal,
    pub mark_price: Option<Decimal>,
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
}

/// Calls and puts listed for one expiry.
#[derive(Debug, Clone, Default)]
pub struct OptionChain {
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl OptionChain {
    /// The strike ladder: sorted, deduplicated union of both legs.
    pub fn strikes(&self) -> Vec<Decimal> {
        let mut strikes: Vec<Decimal> = self
            .calls
            .iter()
            .chain(self.puts.iter())
            .map(|c| c.strike)
            .collect();
        strikes.sort();
        strikes.dedup();
        strikes
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }

    pub fn call_at(&self, strike: Decimal) -> Option<&OptionContract> {
        self.calls.iter().find(|c| c.strike == strike)
    }

    pub fn put_at(&self, strike: Decimal) -> Option<&OptionContract> {
        self.puts.iter().find(|c| c.strike == strike)
    }
}

/// Venue-acknowledged order, as returned by the placement endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub state: String,
    pub size: u32,
    #[serde(default)]
    pub average_fill_price: Option<Decimal>,
}

/// Read-only open position row for the /positions display.
#[derive(Debug, Clone, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub product: Option<PositionProduct>,
    pub size: Decimal,
    #[serde(default)]
    pub entry_price: Option<Decimal>,
    #[serde(default)]
    pub mark_price: Option<Decimal>,
    #[serde(default)]
    pub unrealized_pnl: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PositionProduct {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub strike_price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn expiry_parses_from_option_symbol() {
        let exp = Expiry::from_option_symbol("C-BTC-90000-310125").unwrap();
        assert_eq!(exp.to_string(), "31-01-2025");
        assert_eq!(exp, Expiry::from_option_symbol("P-BTC-64500-310125").unwrap());

        assert!(Expiry::from_option_symbol("BTCUSD").is_none());
        assert!(Expiry::from_option_symbol("C-BTC-90000-banana").is_none());
    }

    #[test]
    fn expiry_round_trips_through_display() {
        let exp: Expiry = "29-09-2025".parse().unwrap();
        assert_eq!(exp.to_string(), "29-09-2025");
    }

    fn contract(ct: ContractType, strike: Decimal) -> OptionContract {
        OptionContract {
            symbol: format!("{}-BTC-{}-310125", if ct == ContractType::Call { "C" } else { "P" }, strike),
            product_id: 1,
            contract_type: ct,
            strike,
            mark_price: None,
            best_bid: None,
            best_ask: None,
        }
    }

    #[test]
    fn ladder_is_sorted_union_of_both_legs() {
        let chain = OptionChain {
            calls: vec![contract(ContractType::Call, dec!(65000)), contract(ContractType::Call, dec!(64000))],
            puts: vec![contract(ContractType::Put, dec!(64500)), contract(ContractType::Put, dec!(64000))],
        };
        assert_eq!(chain.strikes(), vec![dec!(64000), dec!(64500), dec!(65000)]);
    }
}
