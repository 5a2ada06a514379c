use std::num::NonZeroU16;

use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{check, model::BotSlashCommand, require, SlashCtx},
    error::CommandResult,
};

/// Sets the playback volume.
#[derive(CommandModel, CreateCommand)]
#[command(name = "volume", desc = "Sets the playback volume.", contexts = "guild")]
pub struct Volume {
    /// The new volume, from 1 to 100.
    #[command(min_value = 1, max_value = 100)]
    level: i64,
}

impl BotSlashCommand for Volume {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let level = NonZeroU16::new(self.level as u16).expect("level is at least 1");

        let mut data_w = data.write().await;
        player.set_volume_with(level, &mut data_w).await?;
        drop(data_w);

        ctx.out(format!("🔊 Volume set to **{level}**.")).await?;
        Ok(())
    }
}
