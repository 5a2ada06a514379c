use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_mention::Mention;

use crate::{
    command::{check, model::BotSlashCommand, require, SlashCtx},
    core::model::{BotStateAware, CacheAware},
    error::CommandResult,
    gateway::{GuildIdAware, SenderAware},
};

/// Leaves the voice channel and clears the queue.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "leave",
    desc = "Leaves the voice channel and clears the queue.",
    contexts = "guild"
)]
pub struct Leave;

impl BotSlashCommand for Leave {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let guild_id = ctx.guild_id();
        require::player(&ctx)?;
        check::user_in_bot_voice(&ctx)?;

        let voice = ctx
            .cache()
            .voice_state(ctx.bot().user_id(), guild_id)
            .map(|state| state.channel_id());

        super::destroy_session(ctx.bot(), guild_id).await;
        super::disconnect(ctx.sender(), guild_id)?;

        match voice {
            Some(channel_id) => {
                ctx.out(format!("📎 ~~{}~~", channel_id.mention())).await?;
            }
            None => ctx.out("👋 Left the voice channel.").await?,
        }
        Ok(())
    }
}
