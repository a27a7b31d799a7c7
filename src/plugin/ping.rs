use crate::{context::Context, event::*, plugin::*};
use anyhow::Result;
use serenity::all::{CreateInteractionResponse, CreateInteractionResponseMessage};

pub struct PluginPing;

#[serenity::async_trait]
impl Plugin for PluginPing {
    fn name(&self) -> &'static str {
        "Ping"
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some(cmd) = event.is_command("ping") else {
            return Ok(EventHandled::No);
        };

        cmd.create_response(
            ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().content("Pong!"),
            ),
        )
        .await?;

        Ok(EventHandled::Yes)
    }
}
