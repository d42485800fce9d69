// src/notifier/callbacks.rs

use super::commands::{make_expiry_keyboard, make_main_menu_keyboard};
use super::{StateStorage, UserState, callback_data};
use crate::config::Config;
use crate::error::TradeError;
use crate::exchange::Exchange;
use crate::exchange::types::Expiry;
use crate::models::Strategy;
use crate::trader::Trader;
use crate::utils::{format_positions_message, format_report_message, format_snapshot_message};
use teloxide::prelude::*;
use teloxide::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::{error, info, warn};

fn make_cancel_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "❌ Cancel",
        callback_data::CANCEL_TRADE,
    )]])
}

/// What the requesting user reads for each failure kind. Nothing here is
/// fatal to the bot; the chat just gets told.
fn user_error_text(e: &TradeError) -> String {
    match e {
        TradeError::NoQuote(symbol) => {
            format!("❌ Unable to fetch the {symbol} spot price. Please try again.")
        }
        TradeError::InvalidExpiry(expiry) => {
            format!("❌ No options listed for {expiry}. Pick another expiry with /expiry.")
        }
        TradeError::ExchangeRejected { .. } => format!("❌ {e}."),
        TradeError::Transport(_) => format!("❌ Network problem talking to the exchange: {e}."),
        TradeError::Decode(_) => format!("❌ {e}."),
    }
}

pub async fn handle_callback<E>(
    bot: Bot,
    q: CallbackQuery,
    exchange: E,
    state_storage: StateStorage,
    cfg: Config,
) -> anyhow::Result<()>
where
    E: Exchange + Clone + Send + Sync + 'static,
{
    let Some(data) = q.data else { return Ok(()) };
    let Some(message) = q.message.as_ref() else {
        warn!("Callback query {} without message", q.id);
        return Ok(());
    };
    let chat_id = message.chat().id;
    let message_id = message.id();

    // Answer early so the button stops spinning.
    let callback_id = q.id.clone();
    let _ = bot.answer_callback_query(callback_id.clone()).await;

    match data.as_str() {
        callback_data::SELECT_EXPIRY => {
            info!("Showing expiry selection for chat_id: {}", chat_id);
            match exchange.list_expiries(&cfg.underlying).await {
                Ok(expiries) if expiries.is_empty() => {
                    bot.edit_message_text(
                        chat_id,
                        message_id,
                        "❌ No expiry dates available. Please try again later.",
                    )
                    .await?;
                }
                Ok(expiries) => {
                    bot.edit_message_text(chat_id, message_id, "📅 Select BTC options expiry date:")
                        .reply_markup(make_expiry_keyboard(&expiries))
                        .await?;
                }
                Err(e) => {
                    error!("Failed to fetch expiries for chat_id {}: {}", chat_id, e);
                    bot.edit_message_text(chat_id, message_id, user_error_text(&e))
                        .await?;
                }
            }
        }

        callback_data::SHOW_POSITIONS => {
            info!("Fetching positions via callback for chat_id: {}", chat_id);
            match exchange.get_positions().await {
                Ok(positions) => {
                    bot.edit_message_text(chat_id, message_id, format_positions_message(&positions))
                        .await?;
                }
                Err(e) => {
                    error!("Failed to fetch positions for chat_id {}: {}", chat_id, e);
                    bot.edit_message_text(chat_id, message_id, user_error_text(&e))
                        .await?;
                }
            }
        }

        callback_data::CANCEL_TRADE => {
            info!("User {} cancelled the trade dialog.", chat_id);
            {
                let mut state_guard = state_storage
                    .write()
                    .expect("Failed to acquire write lock on state storage");
                state_guard.insert(chat_id, UserState::None);
            }
            bot.edit_message_text(chat_id, message_id, "❌ Trade cancelled.")
                .reply_markup(make_main_menu_keyboard())
                .await?;
        }

        data if data.starts_with(callback_data::EXPIRY_PREFIX) => {
            let raw = &data[callback_data::EXPIRY_PREFIX.len()..];
            let Ok(expiry) = raw.parse::<Expiry>() else {
                warn!("Received malformed expiry callback data: {}", data);
                return Ok(());
            };

            info!("User {} selected expiry {}", chat_id, expiry);
            bot.edit_message_text(chat_id, message_id, format!("🔄 Processing expiry {expiry}..."))
                .await?;

            let trader = Trader::new(exchange.clone(), cfg.clone());
            match trader.atm_snapshot(expiry).await {
                Ok(snapshot) => {
                    if snapshot.legs().is_none() {
                        bot.edit_message_text(
                            chat_id,
                            message_id,
                            "❌ ATM options not found for this expiry date.",
                        )
                        .await?;
                        return Ok(());
                    }

                    let text = format!(
                        "{}\n💰 Enter the lot size (contracts per leg):",
                        format_snapshot_message(&snapshot)
                    );
                    bot.edit_message_text(chat_id, message_id, text)
                        .reply_markup(make_cancel_keyboard())
                        .await?;

                    let mut state_guard = state_storage
                        .write()
                        .expect("Failed to acquire write lock on state storage");
                    state_guard.insert(
                        chat_id,
                        UserState::AwaitingLotSize {
                            snapshot,
                            last_bot_message_id: Some(message_id.0),
                        },
                    );
                    info!("User state for {} set to AwaitingLotSize", chat_id);
                }
                Err(e) => {
                    error!("ATM snapshot for {} failed: {}", expiry, e);
                    bot.edit_message_text(chat_id, message_id, user_error_text(&e))
                        .await?;
                }
            }
        }

        data if data.starts_with(callback_data::STRATEGY_PREFIX) => {
            let raw = &data[callback_data::STRATEGY_PREFIX.len()..];
            let Some(strategy) = Strategy::from_callback(raw) else {
                warn!("Received malformed strategy callback data: {}", data);
                return Ok(());
            };

            // Pull the pending trade out of the dialog state; the guard
            // must be gone before the exchange round trips below.
            let pending = {
                let mut state_guard = state_storage
                    .write()
                    .expect("Failed to acquire write lock on state storage");
                match state_guard.get(&chat_id) {
                    Some(UserState::AwaitingStrategy { snapshot, lot_size, .. }) => {
                        let pending = (snapshot.clone(), *lot_size);
                        state_guard.insert(chat_id, UserState::None);
                        Some(pending)
                    }
                    _ => None,
                }
            };

            let Some((snapshot, lot_size)) = pending else {
                warn!("User {} pressed a strategy button outside a dialog.", chat_id);
                bot.edit_message_text(
                    chat_id,
                    message_id,
                    "⚠️ This dialog has expired. Start over with /expiry.",
                )
                .await?;
                return Ok(());
            };
            let Some((call, put)) = snapshot.legs() else {
                // AwaitingStrategy is only ever set with both legs present.
                warn!("Pending trade for {} lost a leg; resetting.", chat_id);
                return Ok(());
            };

            info!(
                "User {} confirmed {} x{} on strike {}",
                chat_id, strategy, lot_size, snapshot.strike
            );
            bot.edit_message_text(chat_id, message_id, "🔄 Executing orders...")
                .await?;

            let trader = Trader::new(exchange.clone(), cfg.clone());
            let report = trader.execute_straddle(call, put, lot_size, strategy).await;
            bot.edit_message_text(chat_id, message_id, format_report_message(&report, call, put))
                .reply_markup(make_main_menu_keyboard())
                .await?;
        }

        _ => {
            warn!("Received unknown callback data: {}", data);
            let _ = bot
                .answer_callback_query(callback_id)
                .text("Unknown action")
                .await;
        }
    }

    Ok(())
}
