//! The Serenity crate we're using for the Discord API is designed around
//! callbacks to handle events.  That does not mesh well with our plugin
//! framework, so the handler translates the callbacks into a distinct Event
//! enum.  Requests arriving from the poller or the webhook relay are
//! injected here as well, so both sources flow through the same dispatch.

use crate::context::Context;
use crate::media::MediaRequest;
use serenity::all::{CommandInteraction, Reaction, Ready};

pub enum Event {
    Ready(Ready),
    ReactionAdd(Reaction),
    InteractionCreate(CommandInteraction),
    /// A normalized media request from either source adapter, ready to be
    /// rendered as a notification.
    RequestArrived(MediaRequest),
}

impl Event {
    // When an event occurs, iterate over all the plugins to see if any can/should handle it.
    pub async fn handle(self, ctx: Context<'_>) {
        for plugin in crate::plugin::plugins() {
            match plugin.handle(&ctx, &self).await {
                Ok(EventHandled::Yes) => return,
                Ok(EventHandled::No) => continue,
                Err(err) => eprintln!("Error in plugin {}: {}", plugin.name(), err),
            }
        }
    }

    /// Check if this is a slash command invocation with the given name.
    pub fn is_command(&self, name: &str) -> Option<&CommandInteraction> {
        match self {
            Event::InteractionCreate(cmd) if cmd.data.name == name => Some(cmd),
            _ => None,
        }
    }
}

pub enum EventHandled {
    Yes,
    No,
}
