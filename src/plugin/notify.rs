//! Notification renderer: turns an arrived request into an embed message
//! with the two moderation reactions attached.

use crate::{context::Context, event::*, log_event, log_internal, logging::AsyncPrintColor, media, plugin::*};
use anyhow::Result;
use serenity::all::{CreateMessage, ReactionType};

pub struct PluginNotify;

#[serenity::async_trait]
impl Plugin for PluginNotify {
    fn name(&self) -> &'static str {
        "Notify"
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::RequestArrived(request) = event else {
            return Ok(EventHandled::No);
        };

        // Read the destination on every render so `/setchannel` takes effect
        // on the next request without a restart.
        let Some(channel_id) = ctx.pstate.read().await.notification_channel() else {
            log_internal!(
                "No notification channel configured; dropping request {}",
                request.request_id
            );
            return Ok(EventHandled::Yes);
        };

        let message = match channel_id
            .send_message(
                ctx.cache_http,
                CreateMessage::new().embed(media::notification_embed(request)),
            )
            .await
        {
            Ok(message) => message,
            Err(err) => {
                // The channel may be deleted or the bot may lack access.
                // The id stays out of the ledger so the next poll cycle
                // tries again.
                log_internal!(
                    "Could not notify {} of request {}: {}",
                    channel_id.color(ctx.http).await,
                    request.request_id,
                    err
                );
                return Ok(EventHandled::Yes);
            }
        };

        // Approve first, then decline, so the reactions always line up the
        // same way under the embed.
        message
            .react(
                ctx.cache_http,
                ReactionType::Unicode(media::APPROVE_EMOJI.to_string()),
            )
            .await?;
        message
            .react(
                ctx.cache_http,
                ReactionType::Unicode(media::DECLINE_EMOJI.to_string()),
            )
            .await?;

        ctx.vstate
            .write()
            .await
            .ledger
            .mark(request.request_id.clone());

        log_event!(
            "Notified {} of request {}",
            channel_id.color(ctx.http).await,
            request.request_id,
        );

        Ok(EventHandled::Yes)
    }
}
