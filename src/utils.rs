// src/utils.rs

use crate::exchange::types::{OptionContract, Position};
use crate::models::{AtmSnapshot, StraddleReport};
use rust_decimal::Decimal;

/// Parse and bound a user-entered lot size. The error string is sent
/// back to the chat as-is.
pub fn validate_lot_size(text: &str, max: u32) -> Result<u32, String> {
    let lot_size: u32 = text
        .trim()
        .parse()
        .map_err(|_| "❌ Please enter a whole number for lot size.".to_string())?;
    if lot_size == 0 {
        return Err("❌ Lot size must be at least 1 contract.".to_string());
    }
    if lot_size > max {
        return Err(format!("❌ Lot size cannot exceed {max} contracts."));
    }
    Ok(lot_size)
}

fn format_price(price: Option<Decimal>) -> String {
    match price {
        Some(p) => format!("${p:.2}"),
        None => "N/A".to_string(),
    }
}

fn format_leg(contract: &OptionContract) -> String {
    format!(
        "   Symbol: {}\n   Mark: {}\n   Bid: {}   Ask: {}\n",
        contract.symbol,
        format_price(contract.mark_price),
        format_price(contract.best_bid),
        format_price(contract.best_ask),
    )
}

/// The expiry-selection result shown before the lot-size prompt.
pub fn format_snapshot_message(snapshot: &AtmSnapshot) -> String {
    let mut message = format!(
        "📅 Expiry: {}\n💰 BTC Spot Price: ${:.2}\n🎯 ATM Strike: ${:.0}\n\n",
        snapshot.expiry, snapshot.spot, snapshot.strike,
    );
    if let Some(call) = &snapshot.call {
        message.push_str("📈 ATM Call (CE):\n");
        message.push_str(&format_leg(call));
        message.push('\n');
    }
    if let Some(put) = &snapshot.put {
        message.push_str("📉 ATM Put (PE):\n");
        message.push_str(&format_leg(put));
    }
    message
}

/// Per-leg execution outcome, one block per leg, failures included.
pub fn format_report_message(
    report: &StraddleReport,
    call: &OptionContract,
    put: &OptionContract,
) -> String {
    let headline = if report.all_filled() {
        format!("✅ {} executed ({} lot(s) per leg)\n\n", report.strategy, report.lot_size)
    } else {
        format!("⚠️ {} partially executed\n\n", report.strategy)
    };

    let mut message = headline;
    for (label, contract, outcome) in [
        ("📈 CE Order", call, &report.call),
        ("📉 PE Order", put, &report.put),
    ] {
        match outcome {
            Ok(order) => {
                message.push_str(&format!(
                    "{label}: {}\n   Order ID: {}\n   Status: {}\n   Avg Fill: {}\n\n",
                    contract.symbol,
                    order.id,
                    order.state,
                    format_price(order.average_fill_price),
                ));
            }
            Err(e) => {
                message.push_str(&format!("{label} FAILED: {}\n   {e}\n\n", contract.symbol));
            }
        }
    }
    message
}

const POSITIONS_DISPLAY_LIMIT: usize = 10;

/// Open-positions listing for /positions. Zero-size rows are skipped.
pub fn format_positions_message(positions: &[Position]) -> String {
    let mut rows = Vec::new();
    for position in positions.iter() {
        if position.size.is_zero() {
            continue;
        }
        let symbol = position
            .product
            .as_ref()
            .and_then(|p| p.symbol.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        let (side, side_emoji) = if position.size.is_sign_positive() {
            ("LONG", "📈")
        } else {
            ("SHORT", "📉")
        };
        let pnl = position.unrealized_pnl.unwrap_or_default();
        let pnl_emoji = if pnl.is_sign_negative() { "🔴" } else { "🟢" };

        rows.push(format!(
            "{}. {} {}\n   Side: {}\n   Size: {} contracts\n   Entry: {}\n   Mark: {}\n   PnL: {} ${:.2}\n",
            rows.len() + 1,
            symbol,
            side_emoji,
            side,
            position.size.abs().normalize(),
            format_price(position.entry_price),
            format_price(position.mark_price),
            pnl_emoji,
            pnl,
        ));
        if rows.len() == POSITIONS_DISPLAY_LIMIT {
            break;
        }
    }

    if rows.is_empty() {
        return "📊 No open positions found.".to_string();
    }
    format!("📊 Open Positions\n\n{}", rows.join("\n"))
}
