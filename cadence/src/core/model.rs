use std::{
    collections::HashMap,
    env,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use moka::future::Cache;
use sqlx::{Pool, Sqlite};
use tokio::{sync::Mutex, task::JoinHandle};
use twilight_cache_inmemory::InMemoryCache;
use twilight_http::{client::InteractionClient, Client};
use twilight_model::{
    application::command::CommandOptionChoice,
    id::{
        marker::{ApplicationMarker, GuildMarker, UserMarker},
        Id,
    },
};

use crate::{core::konst, lavalink::Lavalink, LavalinkAware};

/// Search query -> autocomplete choices, TTL'd so stale search results
/// age out instead of accumulating for the process lifetime.
pub type SearchCache = Cache<Box<str>, Arc<Vec<CommandOptionChoice>>>;

pub struct Config {
    pub token: String,
    pub lavalink_host: String,
    pub lavalink_password: String,
    pub database_url: String,
    pub health_port: u16,
    pub prefix: String,
    pub owner_id: Option<Id<UserMarker>>,
}

impl Config {
    /// Reads the configuration from the environment.
    ///
    /// # Errors
    /// When `BOT_TOKEN`, `LAVALINK_HOST` or `LAVALINK_PASSWORD` is unset.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            token: env::var("BOT_TOKEN")?,
            lavalink_host: env::var("LAVALINK_HOST")?,
            lavalink_password: env::var("LAVALINK_PASSWORD")?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| String::from("sqlite://cadence.db?mode=rwc")),
            health_port: env::var("HEALTH_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(10_000),
            prefix: env::var("PREFIX").unwrap_or_else(|_| String::from("c!")),
            owner_id: env::var("OWNER_ID")
                .ok()
                .and_then(|id| id.parse().ok())
                .map(Id::new),
        })
    }
}

pub struct BotInfo {
    started: Instant,
    guild_count: AtomicUsize,
}

impl BotInfo {
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn guild_count(&self) -> usize {
        self.guild_count.load(Ordering::Relaxed)
    }

    pub fn increment_guild_count(&self) {
        self.guild_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_guild_count(&self) {
        let _ = self
            .guild_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |count| {
                count.checked_sub(1)
            });
    }
}

/// Guild-keyed "alone in voice" countdowns.
///
/// At most one timer per guild; starting a new one aborts the old, so a
/// flood of membership changes cannot stack timers.
#[derive(Default)]
pub struct IdleTimeouts {
    inner: Mutex<HashMap<Id<GuildMarker>, JoinHandle<()>>>,
}

impl IdleTimeouts {
    pub async fn contains(&self, guild_id: Id<GuildMarker>) -> bool {
        self.inner.lock().await.contains_key(&guild_id)
    }

    pub async fn insert(&self, guild_id: Id<GuildMarker>, handle: JoinHandle<()>) {
        if let Some(old) = self.inner.lock().await.insert(guild_id, handle) {
            old.abort();
        }
    }

    pub async fn cancel(&self, guild_id: Id<GuildMarker>) {
        if let Some(handle) = self.inner.lock().await.remove(&guild_id) {
            handle.abort();
        }
    }

    /// Drops the entry without aborting, for the timer task removing itself.
    pub async fn forget(&self, guild_id: Id<GuildMarker>) {
        self.inner.lock().await.remove(&guild_id);
    }
}

pub type BotStateRef<'a> = &'a BotState;
pub type OwnedBotState = Arc<BotState>;

pub trait BotStateAware {
    fn bot(&self) -> BotStateRef;
}

pub trait OwnedBotStateAware: BotStateAware {
    fn bot_owned(&self) -> OwnedBotState;
}

pub trait CacheAware {
    fn cache(&self) -> &InMemoryCache;
}

pub trait HttpAware {
    fn http(&self) -> &Client;
}

pub trait OwnedHttpAware {
    fn http_owned(&self) -> Arc<Client>;
}

pub trait DatabaseAware {
    fn db(&self) -> &Pool<Sqlite>;
}

pub trait ConfigAware {
    fn config(&self) -> &Config;
}

pub struct BotState {
    cache: Arc<InMemoryCache>,
    http: Arc<Client>,
    db: Pool<Sqlite>,
    lavalink: Lavalink,
    config: Config,
    application_id: Id<ApplicationMarker>,
    idle_timeouts: IdleTimeouts,
    search_cache: SearchCache,
    info: BotInfo,
}

impl BotState {
    pub fn new(
        config: Config,
        db: Pool<Sqlite>,
        http: Arc<Client>,
        cache: Arc<InMemoryCache>,
        lavalink: Lavalink,
        application_id: Id<ApplicationMarker>,
    ) -> Self {
        Self {
            cache,
            http,
            db,
            lavalink,
            config,
            application_id,
            idle_timeouts: IdleTimeouts::default(),
            search_cache: Cache::builder()
                .max_capacity(konst::misc::AUTOCOMPLETE_CACHE_SIZE)
                .time_to_live(konst::misc::AUTOCOMPLETE_CACHE_TTL)
                .build(),
            info: BotInfo {
                started: Instant::now(),
                guild_count: AtomicUsize::new(0),
            },
        }
    }

    pub const fn info(&self) -> &BotInfo {
        &self.info
    }

    pub const fn idle_timeouts(&self) -> &IdleTimeouts {
        &self.idle_timeouts
    }

    pub const fn search_cache(&self) -> &SearchCache {
        &self.search_cache
    }

    pub fn interaction(&self) -> InteractionClient<'_> {
        self.http.interaction(self.application_id)
    }

    pub fn user_id(&self) -> Id<UserMarker> {
        self.cache
            .current_user()
            .expect("current user must be in cache")
            .id
    }
}

impl LavalinkAware for BotState {
    fn lavalink(&self) -> &Lavalink {
        &self.lavalink
    }
}

impl CacheAware for BotState {
    fn cache(&self) -> &InMemoryCache {
        &self.cache
    }
}

impl CacheAware for Arc<BotState> {
    fn cache(&self) -> &InMemoryCache {
        &self.cache
    }
}

impl HttpAware for BotState {
    fn http(&self) -> &Client {
        &self.http
    }
}

impl OwnedHttpAware for BotState {
    fn http_owned(&self) -> Arc<Client> {
        self.http.clone()
    }
}

impl DatabaseAware for BotState {
    fn db(&self) -> &Pool<Sqlite> {
        &self.db
    }
}

impl ConfigAware for BotState {
    fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod test {
    use twilight_model::id::Id;

    use super::IdleTimeouts;

    #[tokio::test]
    async fn inserting_twice_keeps_one_timer_and_aborts_the_old() {
        let timeouts = IdleTimeouts::default();
        let guild_id = Id::new(1);

        let first = tokio::spawn(std::future::pending::<()>());
        let first_abort = first.abort_handle();
        timeouts.insert(guild_id, first).await;
        assert!(timeouts.contains(guild_id).await);

        let second = tokio::spawn(std::future::pending::<()>());
        timeouts.insert(guild_id, second).await;

        for _ in 0..100 {
            if first_abort.is_finished() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(first_abort.is_finished());
        assert!(timeouts.contains(guild_id).await);
        timeouts.cancel(guild_id).await;
        assert!(!timeouts.contains(guild_id).await);
    }

    #[tokio::test]
    async fn cancelling_then_reinserting_creates_exactly_one_timer() {
        let timeouts = IdleTimeouts::default();
        let guild_id = Id::new(1);

        timeouts.insert(guild_id, tokio::spawn(std::future::pending::<()>())).await;
        timeouts.cancel(guild_id).await;
        assert!(!timeouts.contains(guild_id).await);

        timeouts.insert(guild_id, tokio::spawn(std::future::pending::<()>())).await;
        assert!(timeouts.contains(guild_id).await);
        timeouts.cancel(guild_id).await;
    }
}
