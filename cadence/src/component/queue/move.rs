use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{check, model::BotSlashCommand, require, SlashCtx},
    error::{CommandResult, UserError},
};

/// Moves a queued track to another position.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "move",
    desc = "Moves a queued track to another position.",
    contexts = "guild"
)]
pub struct Move {
    /// Queue position of the track to move.
    #[command(min_value = 1)]
    from: i64,
    /// Where it should end up.
    #[command(min_value = 1)]
    to: i64,
}

impl BotSlashCommand for Move {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        let mut data_w = data.write().await;
        let queue_len = data_w.queue().len();
        #[allow(clippy::cast_sign_loss)]
        let moved = data_w
            .queue_mut()
            .shift(self.from as usize, self.to as usize)
            .map(|item| item.data().info.title.clone());
        drop(data_w);

        let Some(title) = moved else {
            let out_of_range = if self.from > self.to { self.from } else { self.to };
            return Err(UserError::PositionOutOfRange {
                position: out_of_range,
                queue_len,
            }
            .into());
        };

        ctx.out(format!("📦 Moved `{title}` to position `{}`.", self.to))
            .await?;
        Ok(())
    }
}
