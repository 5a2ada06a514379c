mod join;
mod leave;

pub use self::{join::Join, leave::Leave};

use twilight_gateway::{error::ChannelError, MessageSender};
use twilight_model::{
    gateway::payload::outgoing::UpdateVoiceState,
    id::{
        marker::{ChannelMarker, GuildMarker},
        Id,
    },
};

use crate::{core::model::BotState, lavalink::close_session, LavalinkAware};

pub fn connect_to(
    sender: &MessageSender,
    guild_id: Id<GuildMarker>,
    channel_id: Id<ChannelMarker>,
) -> Result<(), ChannelError> {
    sender.command(&UpdateVoiceState::new(guild_id, Some(channel_id), true, false))
}

pub fn disconnect(sender: &MessageSender, guild_id: Id<GuildMarker>) -> Result<(), ChannelError> {
    sender.command(&UpdateVoiceState::new(guild_id, None, false, false))
}

/// The shared teardown for stop, leave and forced-disconnect paths:
/// cancel the idle countdown, close the session UI and delete the player.
pub async fn destroy_session(bot: &BotState, guild_id: Id<GuildMarker>) {
    bot.idle_timeouts().cancel(guild_id).await;
    if let Some(data) = bot.lavalink().get_player_data(guild_id) {
        close_session(&data).await;
    }
    if let Err(error) = bot.lavalink().delete_player(guild_id).await {
        tracing::warn!(%error, "deleting player during teardown failed");
    }
}
