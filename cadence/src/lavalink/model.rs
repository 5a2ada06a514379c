mod now_playing;
mod queue;

use std::{collections::HashSet, num::NonZeroU16, sync::Arc};

use cadence_ext::time::track_clock::TrackClock;
use lavalink_rs::{
    client::LavalinkClient, error::LavalinkResult, model::track::TrackInfo,
    player_context::PlayerContext,
};
use moka::future::Cache;
use sqlx::{Pool, Sqlite};
use tokio::{
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    task::JoinHandle,
};
use twilight_cache_inmemory::InMemoryCache;
use twilight_http::Client;
use twilight_model::id::{
    marker::{ChannelMarker, GuildMarker, MessageMarker, UserMarker},
    Id,
};

use crate::core::{
    konst,
    model::{CacheAware, DatabaseAware, HttpAware, OwnedHttpAware},
};

pub use self::{
    now_playing::{
        Data as NowPlayingData, Message as NowPlayingMessage, Update as NowPlayingUpdate,
    },
    queue::{Item as QueueItem, Queue, RepeatMode},
};

type LavalinkGuildId = lavalink_rs::model::GuildId;

pub type PlayerData = RwLock<RawPlayerData>;
pub type OwnedPlayerData = Arc<PlayerData>;
pub type PlayerDataRead<'a> = RwLockReadGuard<'a, RawPlayerData>;
pub type PlayerDataWrite<'a> = RwLockWriteGuard<'a, RawPlayerData>;

/// Snapshot of the most recently started track, kept as the autoplay seed
/// after the queue has drained past it.
#[derive(Clone)]
pub struct LastPlayed {
    pub info: TrackInfo,
    pub requester: Id<UserMarker>,
}

/// Per-guild session state, attached to the externally-owned
/// [`PlayerContext`] and looked up fresh by guild id on every use.
///
/// At most one now-playing message and one refresh task exist per guild;
/// every transition that creates either tears down its predecessor first.
pub struct RawPlayerData {
    queue: Queue,
    volume: NonZeroU16,
    clock: TrackClock,
    text_channel_id: Id<ChannelMarker>,
    now_playing: Option<NowPlayingMessage>,
    refresh: Option<JoinHandle<()>>,
    autoplay: bool,
    autoplay_history: HashSet<Box<str>>,
    last_played: Option<LastPlayed>,
}

impl RawPlayerData {
    pub fn new(text_channel_id: Id<ChannelMarker>) -> Self {
        Self {
            text_channel_id,
            volume: NonZeroU16::new(100).expect("100 must be non-zero"),
            queue: Queue::new(),
            clock: TrackClock::new(),
            now_playing: None,
            refresh: None,
            autoplay: false,
            autoplay_history: HashSet::new(),
            last_played: None,
        }
    }

    pub const fn queue(&self) -> &Queue {
        &self.queue
    }

    pub const fn queue_mut(&mut self) -> &mut Queue {
        &mut self.queue
    }

    pub const fn volume(&self) -> NonZeroU16 {
        self.volume
    }

    pub const fn set_volume(&mut self, volume: NonZeroU16) {
        self.volume = volume;
    }

    pub const fn text_channel_id(&self) -> Id<ChannelMarker> {
        self.text_channel_id
    }

    pub const fn set_text_channel_id(&mut self, text_channel_id: Id<ChannelMarker>) {
        self.text_channel_id = text_channel_id;
    }

    pub const fn paused(&self) -> bool {
        self.clock.paused()
    }

    pub fn timestamp(&self) -> std::time::Duration {
        self.clock.position()
    }

    pub fn set_pause(&mut self, state: bool) {
        self.clock.set_pause(state);
    }

    pub fn set_speed(&mut self, multiplier: f64) {
        self.clock.set_speed(multiplier);
    }

    pub fn seek_to(&mut self, timestamp: std::time::Duration) {
        self.clock.seek_to(timestamp);
    }

    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    pub const fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub const fn toggle_autoplay(&mut self) -> bool {
        self.autoplay = !self.autoplay;
        self.autoplay
    }

    pub fn record_played(&mut self, info: &TrackInfo, requester: Id<UserMarker>) {
        self.autoplay_history.insert(info.identifier.clone().into());
        self.last_played = Some(LastPlayed {
            info: info.clone(),
            requester,
        });
    }

    pub const fn autoplay_history(&self) -> &HashSet<Box<str>> {
        &self.autoplay_history
    }

    pub const fn last_played(&self) -> Option<&LastPlayed> {
        self.last_played.as_ref()
    }

    pub const fn now_playing_mut(&mut self) -> Option<&mut NowPlayingMessage> {
        self.now_playing.as_mut()
    }

    pub const fn now_playing_message_id(&self) -> Option<Id<MessageMarker>> {
        match self.now_playing {
            Some(ref msg) => Some(msg.id()),
            None => None,
        }
    }

    pub fn set_now_playing(&mut self, message: NowPlayingMessage) {
        self.now_playing = Some(message);
    }

    pub const fn take_now_playing(&mut self) -> Option<NowPlayingMessage> {
        self.now_playing.take()
    }

    /// Deletes the live now-playing message, if any. Best-effort: a failed
    /// delete only means a stale message lingers, so the error is dropped.
    pub async fn delete_now_playing_message(&mut self, cx: &(impl HttpAware + Sync)) {
        if let Some(message) = self.now_playing.take() {
            let _ = cx
                .http()
                .delete_message(message.channel_id(), message.id())
                .await;
        }
    }

    /// Installs the new refresh task, aborting the superseded one.
    pub fn replace_refresh(&mut self, handle: JoinHandle<()>) {
        if let Some(old) = self.refresh.replace(handle) {
            old.abort();
        }
    }

    pub fn abort_refresh(&mut self) {
        if let Some(handle) = self.refresh.take() {
            handle.abort();
        }
    }

    /// Applies an update to the live now-playing message, also syncing its
    /// displayed elapsed time.
    pub async fn update_now_playing(
        &mut self,
        update: NowPlayingUpdate,
    ) -> Result<(), crate::error::lavalink::UpdateNowPlayingMessageError> {
        let timestamp = self.timestamp();
        if let Some(ref mut msg) = self.now_playing {
            msg.update(update);
            msg.update_timestamp(timestamp);
            msg.apply_update().await?;
        }
        Ok(())
    }
}

/// Tears the session down: the refresh task is aborted, the message
/// reference dropped and the autoplay history cleared. Stale button
/// presses on a leftover message fail the message-id check afterwards.
pub async fn close_session(data: &OwnedPlayerData) {
    let mut data_w = data.write().await;
    data_w.abort_refresh();
    data_w.take_now_playing();
    data_w.autoplay_history.clear();
    data_w.last_played = None;
}

/// Spawns the 5-second now-playing refresh loop for a guild.
///
/// Each tick re-fetches the player context fresh, so the loop never acts
/// on a player that has been destroyed or replaced while it slept; it
/// ends itself once the track or the message is gone, or an edit fails.
pub fn spawn_refresh(lavalink: LavalinkClient, guild_id: LavalinkGuildId) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(konst::misc::NOW_PLAYING_REFRESH_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval.tick().await;

        loop {
            interval.tick().await;

            let Some(player) = lavalink.get_player_context(guild_id) else {
                break;
            };
            let data = player.data_unwrapped();
            let mut data_w = data.write().await;
            if data_w.queue().current().is_none() {
                break;
            }

            let timestamp = data_w.timestamp();
            let Some(msg) = data_w.now_playing_mut() else {
                break;
            };
            msg.update_timestamp(timestamp);
            if let Err(error) = msg.apply_update().await {
                tracing::debug!(?guild_id, %error, "now-playing refresh stopped");
                break;
            }
        }
    })
}

pub struct Lavalink {
    inner: LavalinkClient,
}

impl Lavalink {
    pub fn clone_inner(&self) -> LavalinkClient {
        self.inner.clone()
    }

    pub fn process(&self, event: &twilight_gateway::Event) {
        match event {
            twilight_gateway::Event::VoiceServerUpdate(e) => {
                self.inner
                    .handle_voice_server_update(e.guild_id, e.token.clone(), e.endpoint.clone());
            }
            twilight_gateway::Event::VoiceStateUpdate(e) => {
                self.inner.handle_voice_state_update(
                    e.guild_id
                        .expect("bots can only join guild voice channels"),
                    e.channel_id,
                    e.user_id,
                    e.session_id.clone(),
                );
            }
            _ => {}
        }
    }

    pub fn get_player_context(&self, guild_id: Id<GuildMarker>) -> Option<PlayerContext> {
        self.inner.get_player_context(LavalinkGuildId::from(guild_id))
    }

    pub fn get_player_data(&self, guild_id: Id<GuildMarker>) -> Option<OwnedPlayerData> {
        self.get_player_context(guild_id)
            .map(|player| player.data_unwrapped())
    }

    /// Creates the per-guild player and its session state.
    ///
    /// # Errors
    /// When the voice connection info cannot be obtained in time or the
    /// audio node rejects the player.
    pub async fn new_player(
        &self,
        guild_id: Id<GuildMarker>,
        text_channel_id: Id<ChannelMarker>,
    ) -> LavalinkResult<PlayerContext> {
        let info = self
            .inner
            .get_connection_info(
                LavalinkGuildId::from(guild_id),
                konst::connection::GET_LAVALINK_CONNECTION_INFO_TIMEOUT,
            )
            .await?;
        let data = Arc::new(RwLock::new(RawPlayerData::new(text_channel_id)));
        self.inner
            .create_player_context_with_data(LavalinkGuildId::from(guild_id), info, data)
            .await
    }

    pub async fn load_tracks(
        &self,
        guild_id: Id<GuildMarker>,
        term: &str,
    ) -> LavalinkResult<lavalink_rs::model::track::Track> {
        self.inner
            .load_tracks(LavalinkGuildId::from(guild_id), term)
            .await
    }

    pub async fn delete_player(&self, guild_id: Id<GuildMarker>) -> LavalinkResult<()> {
        self.inner
            .delete_player(LavalinkGuildId::from(guild_id))
            .await
    }

    pub fn data(&self) -> OwnedClientData {
        self.inner.data_unwrapped()
    }

    pub fn iter_player_data(&self) -> impl Iterator<Item = OwnedPlayerData> + use<'_> {
        self.inner
            .players
            .iter()
            .filter_map(|p| p.value().0.load().as_ref().map(|ctx| ctx.data_unwrapped()))
    }
}

impl From<LavalinkClient> for Lavalink {
    fn from(value: LavalinkClient) -> Self {
        Self { inner: value }
    }
}

pub trait UnwrappedData {
    type Data;
    fn data_unwrapped(&self) -> Self::Data;
}

impl UnwrappedData for PlayerContext {
    type Data = OwnedPlayerData;
    fn data_unwrapped(&self) -> Self::Data {
        self.data().expect("player data must exist")
    }
}

impl UnwrappedData for LavalinkClient {
    type Data = OwnedClientData;
    fn data_unwrapped(&self) -> Self::Data {
        self.data().expect("lavalink data must exist")
    }
}

/// Artwork url -> accent colour; a `None` caches a failed extraction so
/// the same broken url is not refetched every refresh.
pub type PaletteCache = Cache<Box<str>, Option<u32>>;

pub type OwnedClientData = Arc<ClientData>;

pub struct ClientData {
    db: Pool<Sqlite>,
    http: Arc<Client>,
    cache: Arc<InMemoryCache>,
    palette_cache: PaletteCache,
}

impl ClientData {
    pub fn new(http: Arc<Client>, cache: Arc<InMemoryCache>, db: Pool<Sqlite>) -> Self {
        Self {
            http,
            cache,
            db,
            palette_cache: Cache::new(10_000),
        }
    }

    pub const fn palette_cache(&self) -> &PaletteCache {
        &self.palette_cache
    }
}

impl HttpAware for ClientData {
    fn http(&self) -> &Client {
        &self.http
    }
}

impl OwnedHttpAware for ClientData {
    fn http_owned(&self) -> Arc<Client> {
        self.http.clone()
    }
}

impl CacheAware for ClientData {
    fn cache(&self) -> &InMemoryCache {
        &self.cache
    }
}

impl DatabaseAware for ClientData {
    fn db(&self) -> &Pool<Sqlite> {
        &self.db
    }
}

#[cfg(test)]
mod test {
    use twilight_model::id::Id;

    use super::RawPlayerData;

    async fn settle(handle: &tokio::task::AbortHandle) {
        for _ in 0..100 {
            if handle.is_finished() {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn replacing_the_refresh_task_aborts_the_predecessor() {
        let mut data = RawPlayerData::new(Id::new(1));

        let first = tokio::spawn(std::future::pending::<()>());
        let first_abort = first.abort_handle();
        data.replace_refresh(first);

        let second = tokio::spawn(std::future::pending::<()>());
        let second_abort = second.abort_handle();
        data.replace_refresh(second);

        settle(&first_abort).await;
        assert!(first_abort.is_finished());
        assert!(!second_abort.is_finished());

        data.abort_refresh();
        settle(&second_abort).await;
        assert!(second_abort.is_finished());
    }

    #[tokio::test]
    async fn repeated_supersession_leaves_exactly_one_live_task() {
        let mut data = RawPlayerData::new(Id::new(1));
        let mut aborts = Vec::new();

        for _ in 0..5 {
            let task = tokio::spawn(std::future::pending::<()>());
            aborts.push(task.abort_handle());
            data.replace_refresh(task);
        }

        let (live, dead) = aborts.split_last().expect("five tasks were spawned");
        for handle in dead {
            settle(handle).await;
            assert!(handle.is_finished());
        }
        assert!(!live.is_finished());
        data.abort_refresh();
    }
}
