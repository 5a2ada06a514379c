use std::{num::NonZeroU16, time::Duration};

use lavalink_rs::{error::LavalinkResult, player_context::PlayerContext};
use twilight_model::id::{marker::ChannelMarker, Id};

use crate::{
    command::model::{Ctx, CtxKind, GuildCtx},
    core::model::CacheAware,
    error::UserError,
    gateway::GuildIdAware,
    lavalink::{OwnedPlayerData, PlayerDataRead, PlayerDataWrite, Queue, QueueItem, UnwrappedData},
    LavalinkAndGuildIdAware,
};

pub fn guild<T: CtxKind>(ctx: Ctx<T>) -> Result<GuildCtx<T>, UserError> {
    GuildCtx::try_from(ctx).map_err(|(error, _)| error)
}

/// An active player, proven to exist for this guild.
pub struct PlayerInterface {
    pub context: PlayerContext,
}

impl PlayerInterface {
    pub fn data(&self) -> OwnedPlayerData {
        self.context.data_unwrapped()
    }

    pub async fn info(&self) -> LavalinkResult<lavalink_rs::model::player::Player> {
        self.context.get_player().await
    }

    /// Pauses or resumes both the audio node and the session clock.
    pub async fn set_pause_with(
        &self,
        pause: bool,
        data: &mut PlayerDataWrite<'_>,
    ) -> LavalinkResult<()> {
        self.context.set_pause(pause).await?;
        data.set_pause(pause);
        Ok(())
    }

    pub async fn seek_to_with(
        &self,
        timestamp: Duration,
        data: &mut PlayerDataWrite<'_>,
    ) -> LavalinkResult<()> {
        self.context.set_position(timestamp).await?;
        data.seek_to(timestamp);
        Ok(())
    }

    pub async fn set_volume_with(
        &self,
        volume: NonZeroU16,
        data: &mut PlayerDataWrite<'_>,
    ) -> LavalinkResult<()> {
        self.context.set_volume(volume.get()).await?;
        data.set_volume(volume);
        Ok(())
    }

    /// Forces the queue forward, returning the new track's title if
    /// anything is left to play.
    pub async fn skip_with(
        &self,
        data: &mut PlayerDataWrite<'_>,
    ) -> LavalinkResult<Option<String>> {
        let next = data.queue_mut().advance(false).map(|item| item.data().clone());
        match next {
            Some(track) => {
                self.context.play_now(&track).await?;
                Ok(Some(track.info.title))
            }
            None => {
                data.abort_refresh();
                self.context.stop_now().await?;
                Ok(None)
            }
        }
    }
}

pub fn player(ctx: &impl LavalinkAndGuildIdAware) -> Result<PlayerInterface, UserError> {
    let context = ctx.get_player().ok_or(UserError::NoPlayer)?;
    Ok(PlayerInterface { context })
}

#[must_use]
pub struct InVoice {
    pub channel_id: Id<ChannelMarker>,
}

/// The invoker must be in a voice channel.
pub fn in_voice<T: CtxKind>(ctx: &GuildCtx<T>) -> Result<InVoice, UserError> {
    let channel_id = ctx
        .cache()
        .voice_state(ctx.author_id(), ctx.guild_id())
        .map(|state| state.channel_id())
        .ok_or(UserError::NotInVoice)?;
    Ok(InVoice { channel_id })
}

pub fn queue_not_empty<'a>(data: &'a PlayerDataRead<'_>) -> Result<&'a Queue, UserError> {
    let queue = data.queue();
    if queue.total_len() == 0 {
        return Err(UserError::QueueEmpty);
    }
    Ok(queue)
}

pub fn current_track(queue: &Queue) -> Result<&QueueItem, UserError> {
    queue.current().ok_or(UserError::NotPlaying)
}
