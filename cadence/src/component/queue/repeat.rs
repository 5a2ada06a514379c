use twilight_interactions::command::{CommandModel, CommandOption, CreateCommand, CreateOption};

use crate::{
    command::{
        check,
        model::{BotSlashCommand, GuildCtx, RespondKind},
        require, SlashCtx,
    },
    component::respond_action,
    error::{command::Error, CommandResult},
    lavalink::{NowPlayingUpdate, OwnedPlayerData, RepeatMode},
};

#[derive(CommandOption, CreateOption)]
pub enum Mode {
    #[option(name = "Off", value = "off")]
    Off,
    #[option(name = "Track", value = "track")]
    Track,
    #[option(name = "Queue", value = "queue")]
    Queue,
}

impl From<Mode> for RepeatMode {
    fn from(value: Mode) -> Self {
        match value {
            Mode::Off => Self::Off,
            Mode::Track => Self::Track,
            Mode::Queue => Self::Queue,
        }
    }
}

/// Sets the loop mode, or cycles to the next one.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "loop",
    desc = "Sets the loop mode, or cycles to the next one.",
    contexts = "guild"
)]
pub struct Repeat {
    /// The mode to use; omit to cycle.
    mode: Option<Mode>,
}

impl BotSlashCommand for Repeat {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::user_in_bot_voice(&ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        let mode = match self.mode {
            Some(mode) => mode.into(),
            None => data.read().await.queue().repeat_mode().next(),
        };
        cycle_repeat(data, &mut ctx, mode, false).await
    }
}

pub async fn cycle_repeat<T: RespondKind>(
    data: OwnedPlayerData,
    ctx: &mut GuildCtx<T>,
    mode: RepeatMode,
    via_controller: bool,
) -> Result<(), Error> {
    let mut data_w = data.write().await;
    data_w.queue_mut().set_repeat_mode(mode);
    if let Err(error) = data_w.update_now_playing(NowPlayingUpdate::Repeat(mode)).await {
        tracing::debug!(%error, "updating now-playing repeat mode failed");
    }
    drop(data_w);

    let message = format!("{} {}.", mode.emoji(), mode.description());
    respond_action(ctx, via_controller, &message).await?;
    Ok(())
}
