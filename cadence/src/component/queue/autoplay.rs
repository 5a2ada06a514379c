use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{
        check,
        model::{BotSlashCommand, GuildCtx, RespondKind},
        require, SlashCtx,
    },
    component::respond_action,
    error::{command::Error, CommandResult},
    lavalink::{NowPlayingUpdate, OwnedPlayerData},
};

/// Toggles autoplay: related tracks keep playing when the queue empties.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "autoplay",
    desc = "Toggles autoplay: related tracks keep playing when the queue empties.",
    contexts = "guild"
)]
pub struct Autoplay;

impl BotSlashCommand for Autoplay {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;

        toggle_autoplay(player.data(), &mut ctx, false).await
    }
}

pub async fn toggle_autoplay<T: RespondKind>(
    data: OwnedPlayerData,
    ctx: &mut GuildCtx<T>,
    via_controller: bool,
) -> Result<(), Error> {
    let mut data_w = data.write().await;
    let enabled = data_w.toggle_autoplay();
    if let Err(error) = data_w
        .update_now_playing(NowPlayingUpdate::Autoplay(enabled))
        .await
    {
        tracing::debug!(%error, "updating now-playing autoplay state failed");
    }
    drop(data_w);

    let message = if enabled {
        "♾️ Autoplay enabled."
    } else {
        "♾️ Autoplay disabled."
    };
    respond_action(ctx, via_controller, message).await?;
    Ok(())
}
