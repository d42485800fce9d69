// src/notifier/commands.rs

use super::{Command, EXPIRY_MENU_LIMIT, StateStorage, UserState, callback_data};
use crate::config::Config;
use crate::exchange::Exchange;
use crate::exchange::types::Expiry;
use crate::utils::format_positions_message;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

const START_MESSAGE: &str = "🚀 Welcome to the BTC Options Straddle Bot!\n\n\
This bot trades BTC option straddles on Delta Exchange India.\n\n\
📅 Pick an expiry, the bot finds the ATM strike from the live spot price,\n\
you choose a lot size and Long or Short, and both legs go out as market orders.\n\n\
Use the menu below or /expiry to start.";

const HELP_MESSAGE: &str = "📖 How to trade:\n\
1️⃣ /expiry and pick an expiry date\n\
2️⃣ The bot shows the ATM Call and Put for that expiry\n\
3️⃣ Enter the lot size (contracts per leg)\n\
4️⃣ Choose Long Straddle (buy CE + PE) or Short Straddle (sell CE + PE)\n\
5️⃣ Both legs are placed at market, one attempt each\n\n\
Note: make sure your Delta Exchange account has sufficient balance.";

pub(super) fn make_main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "📅 Select Expiry",
            callback_data::SELECT_EXPIRY,
        )],
        vec![InlineKeyboardButton::callback(
            "📊 Positions",
            callback_data::SHOW_POSITIONS,
        )],
    ])
}

pub(super) fn make_expiry_keyboard(expiries: &[Expiry]) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = expiries
        .iter()
        .take(EXPIRY_MENU_LIMIT)
        .map(|expiry| {
            vec![InlineKeyboardButton::callback(
                format!("📅 {expiry}"),
                format!("{}{}", callback_data::EXPIRY_PREFIX, expiry),
            )]
        })
        .collect();
    buttons.push(vec![InlineKeyboardButton::callback(
        "❌ Cancel",
        callback_data::CANCEL_TRADE,
    )]);
    InlineKeyboardMarkup::new(buttons)
}

pub async fn handle_command<E>(
    bot: Bot,
    msg: Message,
    cmd: Command,
    exchange: E,
    state_storage: StateStorage,
    cfg: Config,
) -> anyhow::Result<()>
where
    E: Exchange + Clone + Send + Sync + 'static,
{
    let chat_id = msg.chat.id;

    // Any command abandons a dialog in progress.
    {
        let mut state_guard = state_storage
            .write()
            .expect("Failed to acquire write lock on state storage");
        if !matches!(state_guard.get(&chat_id), Some(UserState::None) | None) {
            info!("Resetting dialog state for {} due to new command: {:?}", chat_id, cmd);
            state_guard.insert(chat_id, UserState::None);
        }
    }

    match cmd {
        Command::Start => {
            bot.send_message(chat_id, START_MESSAGE)
                .reply_markup(make_main_menu_keyboard())
                .await?;
        }
        Command::Help => {
            let text = format!("{HELP_MESSAGE}\n\n{}", Command::descriptions());
            bot.send_message(chat_id, text)
                .reply_markup(make_main_menu_keyboard())
                .await?;
        }
        Command::Expiry => {
            info!("Fetching expiry dates for chat_id: {}", chat_id);
            let waiting = bot
                .send_message(chat_id, "📅 Fetching available expiry dates...")
                .await?;
            match exchange.list_expiries(&cfg.underlying).await {
                Ok(expiries) if expiries.is_empty() => {
                    bot.edit_message_text(
                        chat_id,
                        waiting.id,
                        "❌ No expiry dates available. Please try again later.",
                    )
                    .await?;
                }
                Ok(expiries) => {
                    bot.edit_message_text(chat_id, waiting.id, "📅 Select BTC options expiry date:")
                        .reply_markup(make_expiry_keyboard(&expiries))
                        .await?;
                }
                Err(e) => {
                    error!("Failed to fetch expiries for chat_id {}: {}", chat_id, e);
                    bot.edit_message_text(
                        chat_id,
                        waiting.id,
                        format!("❌ Unable to fetch expiry dates: {e}"),
                    )
                    .await?;
                }
            }
        }
        Command::Positions => {
            info!("Fetching positions for chat_id: {}", chat_id);
            match exchange.get_positions().await {
                Ok(positions) => {
                    bot.send_message(chat_id, format_positions_message(&positions))
                        .await?;
                }
                Err(e) => {
                    error!("Failed to fetch positions for chat_id {}: {}", chat_id, e);
                    bot.send_message(chat_id, format!("❌ Unable to fetch positions: {e}"))
                        .await?;
                }
            }
        }
    }
    Ok(())
}
