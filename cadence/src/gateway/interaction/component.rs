use crate::{
    command::{check, model::ComponentMarker, require, ComponentCtx},
    component::{favorite, misc, playback, queue},
    core::statik::component::{ControllerButton, CONTROLLER_PREFIX},
    error::{command::Error, gateway::ProcessResult},
    gateway::GuildIdAware,
    lavalink::UnwrappedData,
    LavalinkAware,
};

impl super::Context {
    /// Dispatches a controller button press.
    ///
    /// Anything that is not a recognised button on the CURRENT
    /// now-playing message is discarded silently: stale messages keep
    /// their buttons after a session ends, and those presses must not do
    /// anything.
    pub(super) async fn process_as_component(self) -> ProcessResult {
        let ctx = ComponentCtx::new(self.inner, self.bot, self.latency, self.sender);
        let Ok(mut ctx) = require::guild(ctx).map_err(|_| ()) else {
            return Ok(());
        };

        let Some(custom_id) = ctx.custom_id().map(ToOwned::to_owned) else {
            return Ok(());
        };
        if !custom_id.starts_with(CONTROLLER_PREFIX) {
            return Ok(());
        }

        let guild_id = ctx.guild_id();
        let Some(player) = ctx.lavalink().get_player_context(guild_id) else {
            return Ok(());
        };
        let data = player.data_unwrapped();

        let data_r = data.read().await;
        let live_message_id = data_r.now_playing_message_id();
        drop(data_r);
        if live_message_id != Some(ctx.message().id) {
            return Ok(());
        }

        let Some(button) = ControllerButton::from_custom_id(&custom_id) else {
            return Ok(());
        };

        if let Err(error) = check::user_in_bot_voice(&ctx) {
            ctx.hid(error.user_message()).await?;
            return Ok(());
        }

        let player = require::PlayerInterface { context: player };
        let result: Result<(), Error> = match button {
            ControllerButton::PlayPause => {
                playback::play_pause(&player, data, &mut ctx, true).await
            }
            ControllerButton::Skip => playback::skip(&player, data, &mut ctx, true).await,
            ControllerButton::Stop => playback::stop(&mut ctx, true).await,
            ControllerButton::Repeat => {
                let mode = data.read().await.queue().repeat_mode().next();
                queue::cycle_repeat(data, &mut ctx, mode, true).await
            }
            ControllerButton::Autoplay => queue::toggle_autoplay(data, &mut ctx, true).await,
            ControllerButton::Shuffle => queue::shuffle_queue(data, &mut ctx, true).await,
            ControllerButton::Queue => show_queue(&mut ctx, data).await,
            ControllerButton::Lyrics => show_lyrics(&mut ctx, data).await,
            ControllerButton::Filter => {
                ctx.hid("🎛️ Pick a preset with `/filter`.").await?;
                Ok(())
            }
            ControllerButton::Favorite => favorite::add_current(&mut ctx, data).await,
        };

        // a button press must never take the listener down with it
        if let Err(error) = result {
            match error {
                Error::User(user_error) => {
                    let _ = ctx.hid(user_error.user_message()).await;
                }
                other => {
                    tracing::error!(error = %other, "controller action failed");
                    let _ = ctx.hid("⚠️ That didn't work, try again.").await;
                }
            }
        }
        Ok(())
    }
}

async fn show_queue(
    ctx: &mut crate::command::GuildCtx<ComponentMarker>,
    data: crate::lavalink::OwnedPlayerData,
) -> Result<(), Error> {
    let data_r = data.read().await;
    require::queue_not_empty(&data_r)?;
    let embed = queue::view_queue(&data_r);
    drop(data_r);
    ctx.hid_embed(embed).await?;
    Ok(())
}

async fn show_lyrics(
    ctx: &mut crate::command::GuildCtx<ComponentMarker>,
    data: crate::lavalink::OwnedPlayerData,
) -> Result<(), Error> {
    let data_r = data.read().await;
    let track = require::current_track(data_r.queue())?;
    let (title, author) = (
        track.data().info.title.clone(),
        track.data().info.author.clone(),
    );
    drop(data_r);

    ctx.defer(true).await?;
    match misc::lyrics_embed_for(&title, &author).await {
        Some(embed) => ctx.followup_embed(embed).await?,
        None => {
            ctx.followup("❌ Could not find lyrics for this song.")
                .await?;
        }
    }
    Ok(())
}
