mod config;
mod context;
mod event;
mod handler;
mod logging;
mod media;
mod overseerr;
mod persistent_state;
mod plugin;
mod poller;
mod volatile_state;
mod webhook;

use serenity::all::GatewayIntents;
use tokio::sync::mpsc;

/// Capacity of the webhook → event-loop handoff channel.  A full channel
/// backpressures the HTTP handler rather than dropping notifications.
const WEBHOOK_INBOX_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = crate::config::Config::load().await?;
    let token = cfg.general.discord_token.clone();
    let webhook_cfg = cfg.webhook.clone();

    let pstate = crate::persistent_state::PersistentState::load().await?;
    let vstate = crate::volatile_state::VolatileState::new();
    let client = crate::overseerr::Client::new(&cfg.overseerr);
    let shared = crate::context::Shared::new(cfg, pstate, vstate, client);

    let inbox = if webhook_cfg.enabled {
        let (tx, rx) = mpsc::channel(WEBHOOK_INBOX_CAPACITY);
        tokio::spawn(async move {
            if let Err(err) = crate::webhook::serve(webhook_cfg.bind_address, tx).await {
                // Running without the configured ingress would be silent
                // partial failure; bail out instead.
                eprintln!("Webhook listener failed: {}", err);
                std::process::exit(1);
            }
        });
        Some(rx)
    } else {
        None
    };

    let handler = handler::Handler::new(shared, inbox);

    // Things we want discord to tell us about.
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::GUILD_MESSAGE_REACTIONS;

    serenity::Client::builder(&token, intents)
        .event_handler(handler)
        .await?
        .start()
        .await
        .map_err(Into::into)
}
