use cadence_ext::pretty::duration_display::DurationDisplay;
use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{model::BotSlashCommand, SlashCtx},
    core::model::BotStateAware,
    error::CommandResult,
};

/// Shows uptime and server statistics.
#[derive(CommandModel, CreateCommand)]
#[command(name = "stats", desc = "Shows uptime and server statistics.")]
pub struct Stats;

impl BotSlashCommand for Stats {
    async fn run(self, mut ctx: SlashCtx) -> CommandResult {
        let info = ctx.bot().info();
        ctx.out(format!(
            "📊 Uptime: `{}` — serving **{}** servers.",
            info.uptime().pretty_display(),
            info.guild_count(),
        ))
        .await?;
        Ok(())
    }
}
