use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{model::BotSlashCommand, SlashCtx},
    error::CommandResult,
};

/// Shows the bot's latency.
#[derive(CommandModel, CreateCommand)]
#[command(name = "ping", desc = "Shows the bot's latency.")]
pub struct Ping;

impl BotSlashCommand for Ping {
    async fn run(self, mut ctx: SlashCtx) -> CommandResult {
        match ctx.latency().average() {
            Some(latency) => {
                ctx.out(format!("🏓 Pong! (`{}ms`)", latency.as_millis()))
                    .await?;
            }
            None => ctx.out("🏓 Pong! (no heartbeat yet)").await?,
        }
        Ok(())
    }
}
