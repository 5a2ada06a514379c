use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use lavalink_rs::{client::LavalinkClient, model::client::NodeDistributionStrategy};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    ConnectOptions,
};
use tokio::task::JoinHandle;
use twilight_cache_inmemory::InMemoryCache;
use twilight_gateway::{
    CloseFrame, Config as ShardConfig, ConfigBuilder, Event, EventTypeFlags, Intents,
    MessageSender, Shard, StreamExt as _,
};
use twilight_http::{client::ClientBuilder, Client};
use twilight_model::{
    channel::message::AllowedMentions,
    gateway::{
        payload::outgoing::update_presence::UpdatePresencePayload,
        presence::{Activity, ActivityType, MinimalActivity, Status},
    },
    id::{marker::UserMarker, Id},
};

use crate::{
    command::declare,
    core::{
        model::{BotState, CacheAware, Config, ConfigAware},
        traced,
    },
    error::runner::StartError,
    gateway,
    lavalink::{handlers, ClientData, Lavalink},
    LavalinkAware,
};

const INTENTS: Intents = Intents::GUILDS
    .union(Intents::GUILD_VOICE_STATES)
    .union(Intents::GUILD_MEMBERS)
    .union(Intents::GUILD_MESSAGES)
    .union(Intents::MESSAGE_CONTENT);

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

fn build_http_client(token: String) -> Arc<Client> {
    ClientBuilder::default()
        .default_allowed_mentions(AllowedMentions::default())
        .token(token)
        .build()
        .into()
}

fn build_shard_config(token: String) -> ShardConfig {
    let presence = UpdatePresencePayload::new(
        [Activity::from(MinimalActivity {
            kind: ActivityType::Listening,
            name: String::from("/play"),
            url: None,
        })],
        false,
        None,
        Status::Online,
    )
    .expect("presence activities must be non-empty");

    ConfigBuilder::new(token, INTENTS).presence(presence).build()
}

#[tracing::instrument(skip_all, name = "lavalink")]
async fn build_lavalink_client(
    user_id: Id<UserMarker>,
    config: &Config,
    data: ClientData,
) -> Lavalink {
    let events = handlers();

    let nodes = Vec::from([lavalink_rs::node::NodeBuilder {
        hostname: config.lavalink_host.clone(),
        password: config.lavalink_password.clone(),
        user_id: user_id.into(),
        ..Default::default()
    }]);

    let strategy = NodeDistributionStrategy::new();
    let client = LavalinkClient::new_with_data(events, nodes, strategy, Arc::new(data)).await;
    client.into()
}

/// Boots everything: database, HTTP, cache, audio node, shards, the
/// health endpoint, then runs the gateway until a shutdown signal.
pub async fn start() -> Result<(), StartError> {
    tracing::debug!("began starting the bot");
    let config = Config::from_env()?;

    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .log_statements(log::LevelFilter::Debug);
    let db = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    crate::db::MIGRATOR.run(&db).await?;

    let http = build_http_client(config.token.clone());
    let cache = Arc::new(InMemoryCache::new());

    let user_id = http.current_user().await?.model().await?.id;
    let application_id = http.current_user_application().await?.model().await?.id;

    let data = ClientData::new(http.clone(), cache.clone(), db.clone());
    let lavalink = build_lavalink_client(user_id, &config, data).await;

    let shard_config = build_shard_config(config.token.clone());
    let shards =
        twilight_gateway::create_recommended(&http, shard_config, |_, builder| builder.build())
            .await?;

    let bot = Arc::new(BotState::new(
        config,
        db,
        http,
        cache,
        lavalink,
        application_id,
    ));
    declare::register_global_commands(&bot).await?;

    traced::tokio_spawn(crate::health::serve(bot.config().health_port));

    let mut senders = Vec::new();
    let mut tasks = Vec::new();
    for shard in shards {
        senders.push(shard.sender());
        tasks.push(tokio::spawn(handle_gateway_events(shard, bot.clone())));
    }

    tracing::info!("cadence is up");
    wait_until_shutdown(senders, tasks, &bot).await;
    Ok(())
}

#[tracing::instrument(skip_all, name = "gateway")]
async fn handle_gateway_events(mut shard: Shard, bot: Arc<BotState>) {
    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        let event = match item {
            Ok(Event::GatewayClose(_)) if SHUTDOWN.load(Ordering::Relaxed) => break,
            Ok(event) => event,
            Err(source) => {
                tracing::warn!(?source, "error receiving event");
                continue;
            }
        };

        tracing::trace!(?event, shard = ?shard.id(), "received event");
        bot.cache().update(&event);
        bot.lavalink().process(&event);

        traced::tokio_spawn(gateway::process(
            bot.clone(),
            event,
            shard.latency().clone(),
            shard.sender(),
        ));
    }
}

#[tracing::instrument]
async fn wait_for_signal() {
    #[cfg(target_family = "unix")]
    {
        use tokio::signal::unix::{self, SignalKind};

        let mut sigint =
            unix::signal(SignalKind::interrupt()).expect("SIGINT handler must install");
        let mut sigterm =
            unix::signal(SignalKind::terminate()).expect("SIGTERM handler must install");

        tokio::select! {
            _ = sigint.recv() => tracing::debug!("received SIGINT"),
            _ = sigterm.recv() => tracing::debug!("received SIGTERM"),
        }
    }

    #[cfg(not(target_family = "unix"))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tracing::instrument(skip_all, name = "shutdown")]
async fn wait_until_shutdown(
    senders: Vec<MessageSender>,
    tasks: Vec<JoinHandle<()>>,
    bot: &BotState,
) {
    wait_for_signal().await;
    SHUTDOWN.store(true, Ordering::Relaxed);
    tracing::info!("gracefully shutting down...");

    tracing::debug!("closing all sessions...");
    for data in bot.lavalink().iter_player_data() {
        let mut data_w = data.write().await;
        data_w.abort_refresh();
        data_w.delete_now_playing_message(bot).await;
    }

    tracing::debug!("sending close frames to all shards...");
    for sender in senders {
        let _ = sender.close(CloseFrame::NORMAL);
    }

    tracing::debug!("awaiting all shard gateway event handlers...");
    for task in tasks {
        let _ = task.await;
    }

    tracing::info!("shut down gracefully");
}
