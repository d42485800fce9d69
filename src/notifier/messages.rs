// src/notifier/messages.rs

use super::{StateStorage, UserState, callback_data};
use crate::config::Config;
use crate::utils::validate_lot_size;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Message};
use tracing::info;

fn make_strategy_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🔼 Long Straddle (buy CE + PE)",
            format!("{}long", callback_data::STRATEGY_PREFIX),
        )],
        vec![InlineKeyboardButton::callback(
            "🔽 Short Straddle (sell CE + PE)",
            format!("{}short", callback_data::STRATEGY_PREFIX),
        )],
        vec![InlineKeyboardButton::callback(
            "❌ Cancel",
            callback_data::CANCEL_TRADE,
        )],
    ])
}

/// Free-text input only matters while we wait for a lot size.
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    state_storage: StateStorage,
    cfg: Config,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    let text = msg.text().unwrap_or("").trim().to_string();

    let current = {
        let state_guard = state_storage
            .read()
            .expect("Failed to acquire read lock on state storage");
        state_guard.get(&chat_id).cloned()
    };

    match current {
        Some(UserState::AwaitingLotSize { snapshot, .. }) => {
            match validate_lot_size(&text, cfg.max_lot_size) {
                Ok(lot_size) => {
                    info!("User {} entered lot size {}", chat_id, lot_size);
                    let prompt = bot
                        .send_message(chat_id, "📊 Choose your strategy:")
                        .reply_markup(make_strategy_keyboard())
                        .await?;

                    let mut state_guard = state_storage
                        .write()
                        .expect("Failed to acquire write lock on state storage");
                    state_guard.insert(
                        chat_id,
                        UserState::AwaitingStrategy {
                            snapshot,
                            lot_size,
                            last_bot_message_id: Some(prompt.id.0),
                        },
                    );
                }
                Err(complaint) => {
                    bot.send_message(chat_id, complaint).await?;
                }
            }
        }
        Some(UserState::AwaitingStrategy { .. }) => {
            bot.send_message(chat_id, "⚠️ Please use the strategy buttons above.")
                .await?;
        }
        _ => {
            bot.send_message(chat_id, "ℹ️ No active dialog. Use /expiry to start trading.")
                .await?;
        }
    }

    Ok(())
}
