use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{check, model::BotSlashCommand, require, SlashCtx},
    error::{CommandResult, UserError},
    lavalink::NowPlayingUpdate,
};

/// Clears the upcoming queue.
#[derive(CommandModel, CreateCommand)]
#[command(name = "clear", desc = "Clears the upcoming queue.", contexts = "guild")]
pub struct Clear;

impl BotSlashCommand for Clear {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        let mut data_w = data.write().await;
        let cleared = data_w.queue().len();
        if cleared == 0 {
            return Err(UserError::QueueEmpty.into());
        }
        data_w.queue_mut().clear();
        let new_len = data_w.queue().total_len();
        if let Err(error) = data_w
            .update_now_playing(NowPlayingUpdate::QueueLen(new_len))
            .await
        {
            tracing::debug!(%error, "updating now-playing queue length failed");
        }
        drop(data_w);

        ctx.out(format!("🧹 Cleared **{cleared}** queued tracks."))
            .await?;
        Ok(())
    }
}
