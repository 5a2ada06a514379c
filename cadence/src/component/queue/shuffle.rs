use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{
        check,
        model::{BotSlashCommand, GuildCtx, RespondKind},
        require, SlashCtx,
    },
    component::respond_action,
    error::{command::Error, CommandResult, UserError},
    lavalink::OwnedPlayerData,
};

/// Shuffles the upcoming queue.
#[derive(CommandModel, CreateCommand)]
#[command(name = "shuffle", desc = "Shuffles the upcoming queue.", contexts = "guild")]
pub struct Shuffle;

impl BotSlashCommand for Shuffle {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;

        shuffle_queue(player.data(), &mut ctx, false).await
    }
}

pub async fn shuffle_queue<T: RespondKind>(
    data: OwnedPlayerData,
    ctx: &mut GuildCtx<T>,
    via_controller: bool,
) -> Result<(), Error> {
    let mut data_w = data.write().await;
    if data_w.queue().is_empty() {
        return Err(UserError::QueueEmpty.into());
    }
    data_w.queue_mut().shuffle(&mut rand::rng());
    drop(data_w);

    respond_action(ctx, via_controller, "🔀 Queue shuffled.").await?;
    Ok(())
}
