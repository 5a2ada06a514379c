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

/// Toggles the playback of the current track.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "play-pause",
    desc = "Toggles the playback of the current track.",
    contexts = "guild"
)]
pub struct PlayPause;

impl BotSlashCommand for PlayPause {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        let data_r = data.read().await;
        require::current_track(require::queue_not_empty(&data_r)?)?;
        drop(data_r);

        play_pause(&player, data, &mut ctx, false).await
    }
}

pub async fn play_pause<T: RespondKind>(
    player: &require::PlayerInterface,
    data: OwnedPlayerData,
    ctx: &mut GuildCtx<T>,
    via_controller: bool,
) -> Result<(), Error> {
    let mut data_w = data.write().await;
    let pause = !data_w.paused();
    player.set_pause_with(pause, &mut data_w).await?;
    if let Err(error) = data_w.update_now_playing(NowPlayingUpdate::Paused(pause)).await {
        tracing::debug!(%error, "updating now-playing pause state failed");
    }
    drop(data_w);

    let message = if pause { "⏸️ Paused." } else { "▶️ Resumed." };
    respond_action(ctx, via_controller, message).await?;
    Ok(())
}
