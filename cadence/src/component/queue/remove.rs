use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{check, model::BotSlashCommand, require, SlashCtx},
    error::{CommandResult, UserError},
    lavalink::NowPlayingUpdate,
};

/// Removes a track from the queue.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "remove",
    desc = "Removes a track from the queue.",
    contexts = "guild"
)]
pub struct Remove {
    /// Queue position of the track to remove.
    #[command(min_value = 1)]
    position: i64,
}

impl BotSlashCommand for Remove {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        let mut data_w = data.write().await;
        let queue_len = data_w.queue().len();
        #[allow(clippy::cast_sign_loss)]
        let removed = data_w
            .queue_mut()
            .remove(self.position as usize)
            .ok_or(UserError::PositionOutOfRange {
                position: self.position,
                queue_len,
            })?;
        let new_len = data_w.queue().total_len();
        if let Err(error) = data_w
            .update_now_playing(NowPlayingUpdate::QueueLen(new_len))
            .await
        {
            tracing::debug!(%error, "updating now-playing queue length failed");
        }
        drop(data_w);

        ctx.out(format!("🗑️ Removed `{}`.", removed.data().info.title))
            .await?;
        Ok(())
    }
}
