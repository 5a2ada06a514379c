use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{
        check,
        model::{BotSlashCommand, GuildCtx, RespondKind},
        require, SlashCtx,
    },
    component::{connection, respond_action},
    core::model::BotStateAware,
    error::{command::Error, CommandResult},
    gateway::{GuildIdAware, SenderAware},
};

/// Stops playback, clears the queue and disconnects.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "stop",
    desc = "Stops playback, clears the queue and disconnects.",
    contexts = "guild"
)]
pub struct Stop;

impl BotSlashCommand for Stop {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        require::player(&ctx)?;

        stop(&mut ctx, false).await
    }
}

pub async fn stop<T: RespondKind>(
    ctx: &mut GuildCtx<T>,
    via_controller: bool,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id();
    connection::destroy_session(ctx.bot(), guild_id).await;
    connection::disconnect(ctx.sender(), guild_id)?;

    respond_action(ctx, via_controller, "⏹️ Stopped music and cleared the queue.").await?;
    Ok(())
}
