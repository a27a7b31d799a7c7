//! Reaction reconciler: maps ✅/❌ reactions on request notifications to
//! approve/decline calls against Overseerr, then freezes the message.
//!
//! A message moves from pending (two reactions, request-id footer) to
//! resolved (reactions cleared, `Status` field present) exactly once; the
//! cleared reactions are the terminal marker, there is no separate store.

use crate::{context::Context, event::*, log_event, media, plugin::*};
use anyhow::Result;
use serenity::all::{ChannelId, EditMessage, Reaction, UserId};
use serenity::builder::CreateEmbed;

pub struct PluginModeration;

#[serenity::async_trait]
impl Plugin for PluginModeration {
    fn name(&self) -> &'static str {
        "Moderation"
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::ReactionAdd(reaction) = event else {
            return Ok(EventHandled::No);
        };

        let bot_id = ctx.cache.current_user().id;
        let configured = ctx.pstate.read().await.notification_channel();

        if !concerns_moderation(reaction.user_id, bot_id, reaction.channel_id, configured) {
            return Ok(EventHandled::No);
        }

        let Some(decision) = media::decision_for(&reaction.emoji) else {
            return Ok(EventHandled::No);
        };

        // Claim the message so a second reaction arriving mid-reconciliation
        // cannot trigger a duplicate API call.
        if !ctx
            .vstate
            .write()
            .await
            .in_flight
            .begin(reaction.message_id)
        {
            return Ok(EventHandled::Yes);
        }

        let result = reconcile(ctx, reaction, decision).await;

        ctx.vstate
            .write()
            .await
            .in_flight
            .finish(reaction.message_id);

        result
    }
}

/// Guard clauses that do not need the message body: ignore the bot's own
/// reactions and anything outside the configured notification channel.
fn concerns_moderation(
    reactor: Option<UserId>,
    bot_id: UserId,
    channel_id: ChannelId,
    configured: Option<ChannelId>,
) -> bool {
    if reactor == Some(bot_id) {
        return false;
    }

    configured == Some(channel_id)
}

async fn reconcile(
    ctx: &Context<'_>,
    reaction: &Reaction,
    decision: media::Decision,
) -> Result<EventHandled> {
    let mut message = reaction.message(ctx.cache_http).await?;

    // Only messages carrying the request-id footer are ours to reconcile.
    let Some(request_id) = message.embeds.iter().find_map(|embed| {
        embed
            .footer
            .as_ref()
            .and_then(|footer| media::parse_request_id(&footer.text))
            .map(str::to_string)
    }) else {
        return Ok(EventHandled::No);
    };

    if let Err(err) = ctx.overseerr.resolve_request(&request_id, decision).await {
        // Leave the embed and reactions untouched so a moderator can retry
        // by re-reacting.
        reaction
            .channel_id
            .say(
                ctx.cache_http,
                format!(
                    "Error {}ing request {}: {}",
                    decision.api_action().trim_end_matches('e'),
                    request_id,
                    err
                ),
            )
            .await?;
        return Ok(EventHandled::Yes);
    }

    let Some(embed) = message.embeds.first().cloned() else {
        return Ok(EventHandled::Yes);
    };

    let updated = media::apply_decision(CreateEmbed::from(embed), decision);
    message
        .edit(ctx.cache_http, EditMessage::new().embed(updated))
        .await?;
    message.delete_reactions(ctx.cache_http).await?;

    log_event!("Request {} {}d", request_id, decision.api_action());

    Ok(EventHandled::Yes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_own_reactions() {
        let bot = UserId::new(1);
        let channel = ChannelId::new(10);

        assert!(!concerns_moderation(Some(bot), bot, channel, Some(channel)));
        assert!(concerns_moderation(
            Some(UserId::new(2)),
            bot,
            channel,
            Some(channel)
        ));
    }

    #[test]
    fn ignores_unconfigured_or_other_channels() {
        let bot = UserId::new(1);
        let user = Some(UserId::new(2));
        let channel = ChannelId::new(10);

        assert!(!concerns_moderation(user, bot, channel, None));
        assert!(!concerns_moderation(
            user,
            bot,
            channel,
            Some(ChannelId::new(11))
        ));
    }
}
