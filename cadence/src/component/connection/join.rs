use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_mention::Mention;

use crate::{
    command::{model::BotSlashCommand, require, SlashCtx},
    core::model::{BotStateAware, CacheAware},
    error::CommandResult,
    gateway::{GuildIdAware, SenderAware},
    LavalinkAware,
};

/// Joins your voice channel.
#[derive(CommandModel, CreateCommand)]
#[command(name = "join", desc = "Joins your voice channel.", contexts = "guild")]
pub struct Join;

impl BotSlashCommand for Join {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let in_voice = require::in_voice(&ctx)?;
        let guild_id = ctx.guild_id();

        let bot_channel = ctx
            .cache()
            .voice_state(ctx.bot().user_id(), guild_id)
            .map(|state| state.channel_id());
        if bot_channel == Some(in_voice.channel_id) {
            ctx.hid(format!("📎 Already connected to {}.", in_voice.channel_id.mention()))
                .await?;
            return Ok(());
        }

        super::connect_to(ctx.sender(), guild_id, in_voice.channel_id)?;
        if ctx.lavalink().get_player_context(guild_id).is_none() {
            let text_channel_id = ctx.channel_id();
            ctx.lavalink().new_player(guild_id, text_channel_id).await?;
        }

        ctx.out(format!("🔊 Joined {}.", in_voice.channel_id.mention()))
            .await?;
        Ok(())
    }
}
