use crate::{context::Shared, event::Event, media::MediaRequest};
use serenity::all::{Interaction, Reaction, Ready};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::{mpsc, Mutex};

/// Discord event handler
pub struct Handler {
    shared: Arc<Shared>,
    /// Receiver half of the webhook handoff channel, handed to the relay
    /// task on the first `ready`.
    inbox: Mutex<Option<mpsc::Receiver<MediaRequest>>>,
    background_started: AtomicBool,
}

impl Handler {
    pub fn new(shared: Arc<Shared>, inbox: Option<mpsc::Receiver<MediaRequest>>) -> Self {
        Self {
            shared,
            inbox: Mutex::new(inbox),
            background_started: AtomicBool::new(false),
        }
    }
}

#[serenity::async_trait]
impl serenity::all::EventHandler for Handler {
    async fn ready(&self, discord_ctx: serenity::all::Context, ready: Ready) {
        // The gateway re-delivers `ready` on reconnect; only spawn the
        // background tasks once.
        if !self.background_started.swap(true, Ordering::SeqCst) {
            tokio::spawn(crate::poller::run(
                self.shared.clone(),
                discord_ctx.clone(),
            ));

            if let Some(inbox) = self.inbox.lock().await.take() {
                tokio::spawn(crate::webhook::relay(
                    self.shared.clone(),
                    discord_ctx.clone(),
                    inbox,
                ));
            }
        }

        Event::Ready(ready).handle(self.shared.ctx(&discord_ctx)).await;
    }

    async fn reaction_add(&self, discord_ctx: serenity::all::Context, reaction: Reaction) {
        Event::ReactionAdd(reaction)
            .handle(self.shared.ctx(&discord_ctx))
            .await;
    }

    async fn interaction_create(
        &self,
        discord_ctx: serenity::all::Context,
        interaction: Interaction,
    ) {
        if let Interaction::Command(cmd) = interaction {
            Event::InteractionCreate(cmd)
                .handle(self.shared.ctx(&discord_ctx))
                .await;
        }
    }
}
