use lavalink_rs::{client::LavalinkClient, model::events::TrackStart};
use twilight_model::id::Id;

use crate::{
    core::model::OwnedHttpAware,
    error::lavalink::ProcessResult,
    lavalink::{
        model::{spawn_refresh, NowPlayingData, NowPlayingMessage, QueueItem},
        UnwrappedData,
    },
};

/// The `Active` transition: tear down the previous now-playing UI, then
/// build this track's message and refresh task.
#[tracing::instrument(err, skip_all, name = "track_start")]
pub(crate) async fn impl_start(
    lavalink: LavalinkClient,
    _: String,
    event: &TrackStart,
) -> ProcessResult {
    let guild_id = event.guild_id;
    tracing::debug!(
        "guild {} started {:?}",
        guild_id.0,
        event.track.info.title
    );

    let Some(player) = lavalink.get_player_context(guild_id) else {
        tracing::error!(?guild_id, "track started without player");
        return Ok(());
    };
    let data = player.data_unwrapped();
    let client_data = lavalink.data_unwrapped();

    {
        let mut data_w = data.write().await;
        data_w.reset_clock();
        let requester = data_w.queue().current().map(QueueItem::requester);
        if let Some(requester) = requester {
            data_w.record_played(&event.track.info, requester);
        }
        // supersede the previous message and refresh task before building
        // anything new; this is what keeps the one-per-guild invariant
        data_w.abort_refresh();
        data_w.delete_now_playing_message(client_data.as_ref()).await;
    }

    let data_r = data.read().await;
    let Some(track) = data_r.queue().current() else {
        return Ok(());
    };
    let msg_data = NowPlayingData::new(&client_data, Id::new(guild_id.0), &data_r, track).await;
    let channel_id = data_r.text_channel_id();
    drop(data_r);

    let message = NowPlayingMessage::new(client_data.http_owned(), msg_data, channel_id).await?;

    let mut data_w = data.write().await;
    data_w.set_now_playing(message);
    data_w.replace_refresh(spawn_refresh(lavalink.clone(), guild_id));
    Ok(())
}
