use lavalink_rs::{
    client::LavalinkClient,
    model::events::{TrackEnd, TrackEndReason},
};

use crate::{
    error::lavalink::ProcessResult,
    lavalink::{autoplay, UnwrappedData},
};

/// Advances the queue on a natural end; an exhausted queue goes down the
/// queue-end path (stop, or autoplay continuation).
#[tracing::instrument(err, skip_all, name = "track_end")]
pub(crate) async fn impl_end(
    lavalink: LavalinkClient,
    _: String,
    event: &TrackEnd,
) -> ProcessResult {
    let guild_id = event.guild_id;
    tracing::debug!(
        "guild {} ended   {:?} ({:?})",
        guild_id.0,
        event.track.info.title,
        event.reason
    );

    let Some(player) = lavalink.get_player_context(guild_id) else {
        tracing::trace!(?guild_id, "track ended via forced disconnection");
        return Ok(());
    };

    // stops and replacements come from explicit control flow, which drives
    // the queue itself; only natural ends advance it here
    if !matches!(
        event.reason,
        TrackEndReason::Finished | TrackEndReason::LoadFailed
    ) {
        return Ok(());
    }
    // a track that failed to load must not be replayed by track-repeat,
    // or the session would retry it forever
    let natural = matches!(event.reason, TrackEndReason::Finished);

    let data = player.data_unwrapped();
    let mut data_w = data.write().await;
    let next = data_w
        .queue_mut()
        .advance(natural)
        .map(|item| item.data().clone());
    drop(data_w);

    if let Some(track) = next {
        player.play_now(&track).await?;
        return Ok(());
    }

    // queue end: the refresh loop stops, the message keeps its last state
    let mut data_w = data.write().await;
    data_w.abort_refresh();
    let autoplay_enabled = data_w.autoplay();
    let seed = data_w.last_played().cloned();
    drop(data_w);

    if !autoplay_enabled {
        return Ok(());
    }
    let Some(seed) = seed else {
        return Ok(());
    };
    autoplay::continue_from(&lavalink, guild_id, seed).await
}
