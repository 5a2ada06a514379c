use std::time::Duration;

use cadence_ext::pretty::duration_display::{parse_timestamp, DurationDisplay};
use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{check, model::BotSlashCommand, require, SlashCtx},
    error::{CommandResult, UserError},
};

/// Seeks the current track to a timestamp.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "seek",
    desc = "Seeks the current track to a timestamp.",
    contexts = "guild"
)]
pub struct Seek {
    /// Where to seek to, e.g. "2:30" or "1m30s".
    timestamp: String,
}

impl BotSlashCommand for Seek {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        let timestamp = parse_timestamp(&self.timestamp)
            .ok_or_else(|| UserError::InvalidTimestamp(self.timestamp.clone().into()))?;

        let mut data_w = data.write().await;
        let track = require::current_track(data_w.queue())?;
        let length = Duration::from_millis(track.data().info.length);
        let timestamp = timestamp.min(length);

        player.seek_to_with(timestamp, &mut data_w).await?;
        drop(data_w);

        ctx.out(format!("⏩ Seeked to `{}`.", timestamp.pretty_display()))
            .await?;
        Ok(())
    }
}
