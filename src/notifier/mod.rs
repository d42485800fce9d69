pub mod callbacks;
pub mod commands;
pub mod messages;

pub use self::callbacks::handle_callback;
pub use self::commands::handle_command;
pub use self::messages::handle_message;

use crate::models::AtmSnapshot;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use teloxide::types::ChatId;
use teloxide::utils::command::BotCommands;

/// Inline-keyboard callback payloads.
pub mod callback_data {
    pub const SELECT_EXPIRY: &str = "select_expiry";
    pub const SHOW_POSITIONS: &str = "show_positions";
    pub const CANCEL_TRADE: &str = "cancel_trade";
    pub const EXPIRY_PREFIX: &str = "expiry_";
    pub const STRATEGY_PREFIX: &str = "strategy_";
}

/// At most this many expiry buttons are offered.
pub const EXPIRY_MENU_LIMIT: usize = 10;

/// Where a chat currently is in the trade dialog.
#[derive(Debug, Clone)]
pub enum UserState {
    /// Expiry picked, ATM resolved; waiting for a lot-size message.
    AwaitingLotSize {
        snapshot: AtmSnapshot,
        last_bot_message_id: Option<i32>,
    },
    /// Lot size entered; waiting for the Long/Short button.
    AwaitingStrategy {
        snapshot: AtmSnapshot,
        lot_size: u32,
        last_bot_message_id: Option<i32>,
    },
    None,
}

/// Per-chat dialog state. Guards are never held across an await.
pub type StateStorage = Arc<RwLock<HashMap<ChatId, UserState>>>;

/// All bot commands.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "BTC options straddle bot:")]
pub enum Command {
    #[command(description = "start the bot and show the menu")]
    Start,
    #[command(description = "show this message", aliases = ["?"])]
    Help,
    #[command(description = "pick an expiry and trade the ATM straddle")]
    Expiry,
    #[command(description = "show open positions")]
    Positions,
}
