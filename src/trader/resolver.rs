// src/trader/resolver.rs

use crate::error::TradeError;
use crate::exchange::types::{Expiry, OptionChain};
use crate::models::AtmSnapshot;
use rust_decimal::Decimal;

/// The ladder element nearest to `spot`. Equidistant neighbours resolve
/// to the LOWER strike; the ordering on (distance, strike) is total, so
/// the result does not depend on ladder order. `None` on an empty ladder.
pub fn nearest_strike(strikes: &[Decimal], spot: Decimal) -> Option<Decimal> {
    strikes
        .iter()
        .copied()
        .min_by(|a, b| {
            let da = (a - spot).abs();
            let db = (b - spot).abs();
            da.cmp(&db).then(a.cmp(b))
        })
}

/// Resolve the ATM strike of `chain` against `spot` and pick out the
/// contracts listed at it. An empty chain means the series is unknown
/// or already expired.
pub fn resolve_atm(
    expiry: Expiry,
    chain: &OptionChain,
    spot: Decimal,
) -> Result<AtmSnapshot, TradeError> {
    let strikes = chain.strikes();
    let strike = nearest_strike(&strikes, spot)
        .ok_or_else(|| TradeError::InvalidExpiry(expiry.to_string()))?;

    Ok(AtmSnapshot {
        expiry,
        spot,
        strike,
        call: chain.call_at(strike).cloned(),
        put: chain.put_at(strike).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::types::{ContractType, OptionContract};
    use rust_decimal_macros::dec;

    fn contract(ct: ContractType, strike: Decimal) -> OptionContract {
        let prefix = match ct {
            ContractType::Call => "C",
            ContractType::Put => "P",
        };
        OptionContract {
            symbol: format!("{prefix}-BTC-{strike}-310125"),
            product_id: strike.mantissa() as i64,
            contract_type: ct,
            strike,
            mark_price: None,
            best_bid: None,
            best_ask: None,
        }
    }

    fn chain(strikes: &[Decimal]) -> OptionChain {
        OptionChain {
            calls: strikes.iter().map(|&s| contract(ContractType::Call, s)).collect(),
            puts: strikes.iter().map(|&s| contract(ContractType::Put, s)).collect(),
        }
    }

    fn expiry() -> Expiry {
        "31-01-2025".parse().unwrap()
    }

    #[test]
    fn picks_the_nearest_strike() {
        let ladder = vec![dec!(64000), dec!(64500), dec!(65000), dec!(65500)];
        assert_eq!(nearest_strike(&ladder, dec!(64950)), Some(dec!(65000)));
    }

    #[test]
    fn no_ladder_element_is_strictly_closer() {
        let ladders = [
            vec![dec!(64000), dec!(64500), dec!(65000), dec!(65500)],
            vec![dec!(60000)],
            vec![dec!(59000), dec!(61000), dec!(88000)],
        ];
        let spots = [dec!(64950), dec!(58999.5), dec!(100000), dec!(0)];

        for ladder in &ladders {
            for &spot in &spots {
                let atm = nearest_strike(ladder, spot).unwrap();
                assert!(ladder.contains(&atm));
                let atm_dist = (atm - spot).abs();
                for &other in ladder {
                    assert!((other - spot).abs() >= atm_dist);
                }
            }
        }
    }

    #[test]
    fn equidistant_spot_resolves_to_the_lower_strike() {
        let ladder = vec![dec!(64500), dec!(65000)];
        assert_eq!(nearest_strike(&ladder, dec!(64750)), Some(dec!(64500)));

        // Ladder order must not matter.
        let reversed = vec![dec!(65000), dec!(64500)];
        assert_eq!(nearest_strike(&reversed, dec!(64750)), Some(dec!(64500)));
    }

    #[test]
    fn empty_ladder_yields_none() {
        assert_eq!(nearest_strike(&[], dec!(64950)), None);
    }

    #[test]
    fn resolve_atm_returns_both_legs_at_the_strike() {
        let chain = chain(&[dec!(64000), dec!(64500), dec!(65000), dec!(65500)]);
        let snapshot = resolve_atm(expiry(), &chain, dec!(64950)).unwrap();

        assert_eq!(snapshot.strike, dec!(65000));
        assert_eq!(snapshot.spot, dec!(64950));
        let (call, put) = snapshot.legs().unwrap();
        assert_eq!(call.contract_type, ContractType::Call);
        assert_eq!(put.contract_type, ContractType::Put);
        assert_eq!(call.strike, dec!(65000));
        assert_eq!(put.strike, dec!(65000));
    }

    #[test]
    fn empty_chain_is_an_invalid_expiry() {
        let err = resolve_atm(expiry(), &OptionChain::default(), dec!(64950)).unwrap_err();
        match err {
            TradeError::InvalidExpiry(e) => assert_eq!(e, "31-01-2025"),
            other => panic!("expected InvalidExpiry, got {other:?}"),
        }
    }

    #[test]
    fn one_sided_listing_leaves_the_missing_leg_empty() {
        let chain = OptionChain {
            calls: vec![contract(ContractType::Call, dec!(65000))],
            puts: vec![],
        };
        let snapshot = resolve_atm(expiry(), &chain, dec!(64950)).unwrap();
        assert!(snapshot.call.is_some());
        assert!(snapshot.put.is_none());
        assert!(snapshot.legs().is_none());
    }
}
