use crate::{context::Context, event::*, log_event, logging::PrintColor, plugin::*};
use anyhow::Result;
use serenity::all::{Command, CommandOptionType, CreateCommand, CreateCommandOption};

pub struct PluginReady;

#[serenity::async_trait]
impl Plugin for PluginReady {
    fn name(&self) -> &'static str {
        "Ready"
    }

    async fn handle(&self, ctx: &Context<'_>, event: &Event) -> Result<EventHandled> {
        let Event::Ready(ready) = event else {
            return Ok(EventHandled::No);
        };

        let commands = vec![
            CreateCommand::new("setchannel")
                .description("Set the notification channel")
                .add_option(
                    CreateCommandOption::new(
                        CommandOptionType::Channel,
                        "channel",
                        "Channel that receives request notifications",
                    )
                    .required(true),
                ),
            CreateCommand::new("ping").description("Check that the bot is alive"),
        ];

        let registered = Command::set_global_commands(ctx.http, commands).await?;

        log_event!("Synced {} commands", registered.len());
        log_event!("Logged in as {}", ready.user.color());

        Ok(EventHandled::Yes)
    }
}
