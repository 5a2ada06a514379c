use twilight_interactions::command::{CommandModel, CreateCommand};

use crate::{
    command::{model::BotSlashCommand, require, SlashCtx},
    core::model::OwnedHttpAware,
    error::CommandResult,
    gateway::GuildIdAware,
    lavalink::{spawn_refresh, NowPlayingData, NowPlayingMessage},
    LavalinkAware,
};

/// Re-sends the now-playing controller message.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "nowplaying",
    desc = "Re-sends the now-playing controller message.",
    contexts = "guild"
)]
pub struct NowPlaying;

impl BotSlashCommand for NowPlaying {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();
        let guild_id = ctx.guild_id();

        let client_data = ctx.lavalink().data();
        let data_r = data.read().await;
        let track = require::current_track(data_r.queue())?;
        let msg_data = NowPlayingData::new(&client_data, guild_id, &data_r, track).await;
        drop(data_r);

        let channel_id = ctx.channel_id();
        let mut data_w = data.write().await;
        data_w.abort_refresh();
        data_w.delete_now_playing_message(client_data.as_ref()).await;
        let message =
            NowPlayingMessage::new(client_data.http_owned(), msg_data, channel_id).await?;
        data_w.set_now_playing(message);
        data_w.replace_refresh(spawn_refresh(ctx.lavalink().clone_inner(), guild_id.into()));
        drop(data_w);

        ctx.hid("🔽 Re-sent the now-playing message.").await?;
        Ok(())
    }
}
