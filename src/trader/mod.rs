// src/trader/mod.rs
//
// The two halves of a user action: resolve (spot -> chain -> ATM strike)
// and dispatch (one market order per leg, single attempt each).

pub mod resolver;

use crate::config::Config;
use crate::error::TradeError;
use crate::exchange::Exchange;
use crate::exchange::types::{Expiry, OptionContract, Order, OrderSide};
use crate::models::{AtmSnapshot, OrderRequest, StraddleReport, Strategy};
use tracing::{error, info};

pub struct Trader<E> {
    exchange: E,
    cfg: Config,
}

impl<E: Exchange> Trader<E> {
    pub fn new(exchange: E, cfg: Config) -> Self {
        Self { exchange, cfg }
    }

    /// Fetch the spot price and the option chain for `expiry`, then
    /// resolve the ATM strike. Stateless: every call re-fetches.
    pub async fn atm_snapshot(&self, expiry: Expiry) -> Result<AtmSnapshot, TradeError> {
        let spot = self.exchange.get_spot_price(&self.cfg.spot_symbol).await?;
        info!("{} spot = {}", self.cfg.spot_symbol, spot);

        let chain = self
            .exchange
            .get_option_chain(&self.cfg.underlying, expiry)
            .await?;
        let snapshot = resolver::resolve_atm(expiry, &chain, spot)?;
        info!(
            "ATM for {} at spot {}: strike {} (call: {}, put: {})",
            expiry,
            spot,
            snapshot.strike,
            snapshot.call.is_some(),
            snapshot.put.is_some(),
        );
        Ok(snapshot)
    }

    /// Place the call leg, then the put leg, as market orders. One
    /// attempt per leg; a failed leg never cancels or retries the other.
    pub async fn execute_straddle(
        &self,
        call: &OptionContract,
        put: &OptionContract,
        lot_size: u32,
        strategy: Strategy,
    ) -> StraddleReport {
        let side = strategy.order_side();
        info!(
            "Executing {} x{}: {} + {} ({})",
            strategy, lot_size, call.symbol, put.symbol, side
        );

        let call_result = self.place_leg(call, side, lot_size).await;
        let put_result = self.place_leg(put, side, lot_size).await;

        StraddleReport {
            strategy,
            lot_size,
            call: call_result,
            put: put_result,
        }
    }

    async fn place_leg(
        &self,
        contract: &OptionContract,
        side: OrderSide,
        size: u32,
    ) -> Result<Order, TradeError> {
        let request = OrderRequest::market(contract, side, size);
        match self.exchange.place_market_order(&request).await {
            Ok(order) => {
                info!("{} leg placed: order {} ({})", contract.symbol, order.id, order.state);
                Ok(order)
            }
            Err(e) => {
                error!("{} leg failed: {}", contract.symbol, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::types::{ContractType, OptionChain, Order, OrderSide, Position};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    /// Canned-response venue that records every order it is asked to place.
    #[derive(Clone, Default)]
    struct MockExchange {
        spot: Option<Decimal>,
        chain: OptionChain,
        reject_call_leg: bool,
        placed: Arc<Mutex<Vec<OrderRequest>>>,
    }

    #[async_trait]
    impl Exchange for MockExchange {
        async fn check_connection(&mut self) -> Result<(), TradeError> {
            Ok(())
        }

        async fn get_spot_price(&self, symbol: &str) -> Result<Decimal, TradeError> {
            self.spot.ok_or_else(|| TradeError::NoQuote(symbol.to_string()))
        }

        async fn list_expiries(&self, _underlying: &str) -> Result<Vec<Expiry>, TradeError> {
            Ok(vec![])
        }

        async fn get_option_chain(
            &self,
            _underlying: &str,
            _expiry: Expiry,
        ) -> Result<OptionChain, TradeError> {
            Ok(self.chain.clone())
        }

        async fn place_market_order(&self, request: &OrderRequest) -> Result<Order, TradeError> {
            self.placed.lock().unwrap().push(request.clone());
            if self.reject_call_leg && request.contract.contract_type == ContractType::Call {
                return Err(TradeError::rejected(
                    "insufficient_margin",
                    Some("margin required 42.5".into()),
                ));
            }
            Ok(Order {
                id: 9000 + request.contract.product_id,
                state: "closed".into(),
                size: request.size,
                average_fill_price: Some(dec!(1375.5)),
            })
        }

        async fn get_positions(&self) -> Result<Vec<Position>, TradeError> {
            Ok(vec![])
        }
    }

    fn contract(ct: ContractType, strike: Decimal, product_id: i64) -> OptionContract {
        let prefix = match ct {
            ContractType::Call => "C",
            ContractType::Put => "P",
        };
        OptionContract {
            symbol: format!("{prefix}-BTC-{strike}-310125"),
            product_id,
            contract_type: ct,
            strike,
            mark_price: Some(dec!(1375.5)),
            best_bid: None,
            best_ask: None,
        }
    }

    fn test_config() -> Config {
        Config::for_tests()
    }

    fn expiry() -> Expiry {
        "31-01-2025".parse().unwrap()
    }

    fn mock_with_chain() -> MockExchange {
        MockExchange {
            spot: Some(dec!(64950)),
            chain: OptionChain {
                calls: vec![
                    contract(ContractType::Call, dec!(64500), 11),
                    contract(ContractType::Call, dec!(65000), 12),
                ],
                puts: vec![
                    contract(ContractType::Put, dec!(64500), 21),
                    contract(ContractType::Put, dec!(65000), 22),
                ],
            },
            ..MockExchange::default()
        }
    }

    #[tokio::test]
    async fn snapshot_resolves_atm_from_live_spot() {
        let trader = Trader::new(mock_with_chain(), test_config());
        let snapshot = trader.atm_snapshot(expiry()).await.unwrap();

        assert_eq!(snapshot.strike, dec!(65000));
        let (call, put) = snapshot.legs().unwrap();
        assert_eq!(call.product_id, 12);
        assert_eq!(put.product_id, 22);
    }

    #[tokio::test]
    async fn snapshot_without_spot_is_no_quote() {
        let mock = MockExchange { spot: None, ..mock_with_chain() };
        let trader = Trader::new(mock, test_config());
        match trader.atm_snapshot(expiry()).await.unwrap_err() {
            TradeError::NoQuote(sym) => assert_eq!(sym, "BTCUSD"),
            other => panic!("expected NoQuote, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn snapshot_of_unlisted_expiry_is_invalid_expiry() {
        let mock = MockExchange { spot: Some(dec!(64950)), ..MockExchange::default() };
        let trader = Trader::new(mock, test_config());
        assert!(matches!(
            trader.atm_snapshot(expiry()).await.unwrap_err(),
            TradeError::InvalidExpiry(_)
        ));
    }

    #[tokio::test]
    async fn long_straddle_dispatches_the_resolved_legs_verbatim() {
        let mock = mock_with_chain();
        let placed = mock.placed.clone();
        let trader = Trader::new(mock, test_config());
        let snapshot = trader.atm_snapshot(expiry()).await.unwrap();
        let (call, put) = snapshot.legs().unwrap();

        let report = trader.execute_straddle(call, put, 3, Strategy::Long).await;

        assert!(report.all_filled());
        assert!(report.call.as_ref().unwrap().id > 0);
        assert!(report.put.as_ref().unwrap().id > 0);

        // Exactly the resolved contracts, the strategy side, the entered
        // size; nothing mutated on the way to the venue.
        let placed = placed.lock().unwrap();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].contract.product_id, 12);
        assert_eq!(placed[0].contract.strike, dec!(65000));
        assert_eq!(placed[1].contract.product_id, 22);
        for request in placed.iter() {
            assert_eq!(request.side, OrderSide::Buy);
            assert_eq!(request.size, 3);
        }
    }

    #[tokio::test]
    async fn short_straddle_sells_both_legs() {
        let mock = mock_with_chain();
        let placed = mock.placed.clone();
        let trader = Trader::new(mock, test_config());
        let snapshot = trader.atm_snapshot(expiry()).await.unwrap();
        let (call, put) = snapshot.legs().unwrap();

        trader.execute_straddle(call, put, 1, Strategy::Short).await;

        let placed = placed.lock().unwrap();
        assert!(placed.iter().all(|r| r.side == OrderSide::Sell));
    }

    #[tokio::test]
    async fn rejected_leg_surfaces_reason_and_spares_the_other() {
        let mock = MockExchange { reject_call_leg: true, ..mock_with_chain() };
        let placed = mock.placed.clone();
        let trader = Trader::new(mock, test_config());
        let snapshot = trader.atm_snapshot(expiry()).await.unwrap();
        let (call, put) = snapshot.legs().unwrap();

        let report = trader.execute_straddle(call, put, 1, Strategy::Long).await;

        assert!(!report.all_filled());
        let err = report.call.as_ref().unwrap_err().to_string();
        assert!(err.contains("insufficient_margin"));
        assert!(err.contains("margin required 42.5"));
        assert!(report.put.is_ok());
        // Both legs were attempted exactly once.
        assert_eq!(placed.lock().unwrap().len(), 2);
    }
}
