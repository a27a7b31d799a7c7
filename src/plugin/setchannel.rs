use crate::{context::Context, event::*, plugin::*};
use anyhow::Result;
use serenity::all::{
    CreateInteractionResponse, CreateInteractionResponseMessage, Mentionable,
};

pub struct PluginSetChannel;

#[serenity::async_trait]
impl Plugin for PluginSetChannel {
    fn name(&self) -> &'static str {
        "SetChannel"
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Some(cmd) = event.is_command("setchannel") else {
            return Ok(EventHandled::No);
        };

        let Some(channel_id) = cmd
            .data
            .options
            .first()
            .and_then(|option| option.value.as_channel_id())
        else {
            cmd.create_response(
                ctx.http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .content("A channel argument is required."),
                ),
            )
            .await?;
            return Ok(EventHandled::Yes);
        };

        // Persist first so the choice survives a restart; the in-memory copy
        // is what the next render call reads.
        {
            let mut pstate = ctx.pstate.write().await;
            pstate.set_notification_channel(channel_id);
            pstate.save().await?;
        }

        cmd.create_response(
            ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(format!("Notification channel set to {}", channel_id.mention())),
            ),
        )
        .await?;

        Ok(EventHandled::Yes)
    }
}
