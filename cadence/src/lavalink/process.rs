use lavalink_rs::{client::LavalinkClient, hook, model::events};

use super::track;

pub fn handlers() -> events::Events {
    events::Events {
        ready: Some(ready),
        track_start: Some(track_start),
        track_end: Some(track_end),
        ..Default::default()
    }
}

#[hook]
async fn ready(_: LavalinkClient, session_id: String, event: &events::Ready) {
    tracing::info!(
        "lavalink node ready (session {session_id}, resumed: {})",
        event.resumed
    );
}

#[hook]
async fn track_start(lavalink: LavalinkClient, session_id: String, event: &events::TrackStart) {
    // errors are logged by the handler's instrumentation
    let _ = track::impl_start(lavalink, session_id, event).await;
}

#[hook]
async fn track_end(lavalink: LavalinkClient, session_id: String, event: &events::TrackEnd) {
    let _ = track::impl_end(lavalink, session_id, event).await;
}
