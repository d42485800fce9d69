// src/telegram.rs

use crate::config::Config;
use crate::exchange::Exchange;
use crate::notifier::{Command, StateStorage, handle_callback, handle_command, handle_message};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use teloxide::{
    dptree,
    prelude::*,
    types::{CallbackQuery, Message},
};

pub async fn run<E>(bot: Bot, exchange: E, cfg: Config)
where
    E: Exchange + Clone + Send + Sync + 'static,
{
    let exchange = Arc::new(exchange);
    let state_storage: StateStorage = Arc::new(RwLock::new(HashMap::new()));

    // 1) Text commands
    let commands_branch = Update::filter_message()
        .filter_command::<Command>()
        .endpoint({
            let exchange = exchange.clone();
            let state_storage = state_storage.clone();
            let cfg = cfg.clone();
            move |bot: Bot, msg: Message, cmd: Command| {
                let exchange = exchange.clone();
                let state_storage = state_storage.clone();
                let cfg = cfg.clone();
                async move {
                    if let Err(err) =
                        handle_command(bot, msg, cmd, (*exchange).clone(), state_storage, cfg).await
                    {
                        tracing::error!("command handler error: {:?}", err);
                    }
                    respond(())
                }
            }
        });

    // 2) Inline callbacks
    let callback_branch = Update::filter_callback_query().endpoint({
        let exchange = exchange.clone();
        let state_storage = state_storage.clone();
        let cfg = cfg.clone();
        move |bot: Bot, q: CallbackQuery| {
            let exchange = exchange.clone();
            let state_storage = state_storage.clone();
            let cfg = cfg.clone();
            async move {
                if let Err(err) =
                    handle_callback(bot, q, (*exchange).clone(), state_storage, cfg).await
                {
                    tracing::error!("callback handler error: {:?}", err);
                }
                respond(())
            }
        }
    });

    // 3) Free text (lot-size input)
    let message_branch = Update::filter_message().endpoint({
        let state_storage = state_storage.clone();
        let cfg = cfg.clone();
        move |bot: Bot, msg: Message| {
            let state_storage = state_storage.clone();
            let cfg = cfg.clone();
            async move {
                if let Err(err) = handle_message(bot, msg, state_storage, cfg).await {
                    tracing::error!("message handler error: {:?}", err);
                }
                respond(())
            }
        }
    });

    Dispatcher::builder(
        bot,
        dptree::entry()
            .branch(commands_branch)
            .branch(callback_branch)
            .branch(message_branch),
    )
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}
