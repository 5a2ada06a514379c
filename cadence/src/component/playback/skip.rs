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

/// Skips the current track.
#[derive(CommandModel, CreateCommand)]
#[command(name = "skip", desc = "Skips the current track.", contexts = "guild")]
pub struct Skip;

impl BotSlashCommand for Skip {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        skip(&player, data, &mut ctx, false).await
    }
}

pub async fn skip<T: RespondKind>(
    player: &require::PlayerInterface,
    data: OwnedPlayerData,
    ctx: &mut GuildCtx<T>,
    via_controller: bool,
) -> Result<(), Error> {
    let mut data_w = data.write().await;
    let skipped = data_w
        .queue()
        .current()
        .map(|item| item.data().info.title.clone())
        .ok_or(UserError::NotPlaying)?;
    let next = player.skip_with(&mut data_w).await?;
    drop(data_w);

    let message = match next {
        Some(title) => format!("⏭️ Skipped `{skipped}`, now playing `{title}`."),
        None => format!("⏭️ Skipped `{skipped}`. The queue is now empty."),
    };
    respond_action(ctx, via_controller, &message).await?;
    Ok(())
}
