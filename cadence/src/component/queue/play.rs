use std::{sync::Arc, time::Duration};

use cadence_ext::pretty::{duration_display::DurationDisplay, truncate::PrettyTruncator};
use twilight_gateway::MessageSender;
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_model::{
    application::{
        command::{CommandOptionChoice, CommandOptionChoiceValue},
        interaction::application_command::{CommandData, CommandOptionValue},
    },
    id::{
        marker::{ChannelMarker, GuildMarker, UserMarker},
        Id,
    },
};

use lavalink_rs::{
    model::track::{TrackData, TrackLoadData, TrackLoadType},
    player_context::PlayerContext,
};

use crate::{
    command::{model::BotSlashCommand, require, AutocompleteCtx, SlashCtx},
    core::{
        konst,
        model::{BotState, BotStateAware, CacheAware},
    },
    error::{
        command::{AutocompleteResult, Error},
        CommandResult, UserError,
    },
    gateway::{GuildIdAware, OptionallyGuildIdAware, SenderAware},
    lavalink::{QueueItem, UnwrappedData},
    LavalinkAware,
};

/// Plays a song or adds it to the queue.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "play",
    desc = "Plays a song or adds it to the queue.",
    contexts = "guild"
)]
pub struct Play {
    /// Song title or URL (YouTube, and anything else the audio node resolves).
    #[command(autocomplete = true)]
    query: String,
}

impl BotSlashCommand for Play {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let in_voice = require::in_voice(&ctx)?;
        ctx.defer(false).await?;

        let guild_id = ctx.guild_id();
        let player = ensure_player(
            ctx.bot(),
            ctx.sender(),
            guild_id,
            in_voice.channel_id,
            ctx.channel_id(),
        )
        .await?;

        let enqueued = play_query(
            ctx.bot(),
            &player,
            guild_id,
            ctx.author_id(),
            &self.query,
        )
        .await?;

        ctx.followup(&enqueued.to_string()).await?;
        Ok(())
    }
}

/// What a play request ended up queueing.
pub enum Enqueued {
    Track { title: String, started: bool },
    Playlist { name: String, count: usize },
}

impl std::fmt::Display for Enqueued {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Track {
                title,
                started: true,
            } => write!(f, "🎵 Now playing `{title}`."),
            Self::Track {
                title,
                started: false,
            } => write!(f, "➕ Added `{title}` to the queue."),
            Self::Playlist { name, count } => {
                write!(f, "🎵 Added **{count}** tracks from **{name}** to the queue.")
            }
        }
    }
}

/// Reuses the guild's player, or connects to the user's channel and
/// creates one. An existing player in a different channel wins: the user
/// must join it instead.
pub async fn ensure_player(
    bot: &BotState,
    sender: &MessageSender,
    guild_id: Id<GuildMarker>,
    user_channel: Id<ChannelMarker>,
    text_channel: Id<ChannelMarker>,
) -> Result<PlayerContext, Error> {
    if let Some(player) = bot.lavalink().get_player_context(guild_id) {
        let bot_channel = bot
            .cache()
            .voice_state(bot.user_id(), guild_id)
            .map(|state| state.channel_id());
        if let Some(bot_channel) = bot_channel {
            if bot_channel != user_channel {
                return Err(UserError::NotInBotVoice(bot_channel).into());
            }
        }
        player.data_unwrapped().write().await.set_text_channel_id(text_channel);
        return Ok(player);
    }

    crate::component::connection::connect_to(sender, guild_id, user_channel)?;
    Ok(bot.lavalink().new_player(guild_id, text_channel).await?)
}

fn is_url(query: &str) -> bool {
    query.starts_with("http://") || query.starts_with("https://")
}

/// Tracks shorter than this are assumed to be shorts/jingles and dropped
/// from plain search results.
const SEARCH_MIN_LENGTH_MS: u64 = 70_000;

enum Loaded {
    Track(TrackData),
    Playlist { name: String, tracks: Vec<TrackData> },
}

async fn resolve(
    bot: &BotState,
    guild_id: Id<GuildMarker>,
    query: &str,
) -> Result<Loaded, Error> {
    let term = if is_url(query) {
        query.to_owned()
    } else {
        format!("ytsearch:{query}")
    };
    let loaded = bot.lavalink().load_tracks(guild_id, &term).await?;

    match (loaded.load_type, loaded.data) {
        (TrackLoadType::Track, Some(TrackLoadData::Track(track))) => Ok(Loaded::Track(track)),
        (TrackLoadType::Playlist, Some(TrackLoadData::Playlist(playlist))) => {
            Ok(Loaded::Playlist {
                name: playlist.info.name,
                tracks: playlist.tracks,
            })
        }
        (TrackLoadType::Search, Some(TrackLoadData::Search(tracks))) => {
            let track = tracks
                .into_iter()
                .find(|track| !track.info.is_stream && track.info.length > SEARCH_MIN_LENGTH_MS)
                .ok_or_else(|| UserError::NoResults(query.into()))?;
            Ok(Loaded::Track(track))
        }
        (TrackLoadType::Empty, _) => Err(UserError::NoResults(query.into()).into()),
        _ => Err(UserError::LoadFailed(query.into()).into()),
    }
}

/// Enqueues the given tracks, starting playback when the player was idle.
/// Returns whether playback was started.
pub async fn enqueue_tracks(
    player: &PlayerContext,
    tracks: Vec<TrackData>,
    requester: Id<UserMarker>,
) -> Result<bool, Error> {
    let data = player.data_unwrapped();
    let mut data_w = data.write().await;
    for track in tracks {
        data_w.queue_mut().enqueue(QueueItem::new(track, requester));
    }
    let next = if data_w.queue().current().is_none() {
        data_w
            .queue_mut()
            .advance(false)
            .map(|item| item.data().clone())
    } else {
        None
    };
    drop(data_w);

    if let Some(track) = next {
        player.play_now(&track).await?;
        return Ok(true);
    }
    Ok(false)
}

/// The full play pipeline shared by the slash and message commands:
/// resolve, enqueue, start if idle.
pub async fn play_query(
    bot: &BotState,
    player: &PlayerContext,
    guild_id: Id<GuildMarker>,
    requester: Id<UserMarker>,
    query: &str,
) -> Result<Enqueued, Error> {
    match resolve(bot, guild_id, query).await? {
        Loaded::Track(track) => {
            let title = track.info.title.clone();
            let started = enqueue_tracks(player, vec![track], requester).await?;
            Ok(Enqueued::Track { title, started })
        }
        Loaded::Playlist { name, tracks } => {
            let count = tracks.len();
            enqueue_tracks(player, tracks, requester).await?;
            Ok(Enqueued::Playlist { name, count })
        }
    }
}

fn focused_query(data: &CommandData) -> Option<&str> {
    data.options.iter().find_map(|option| match option.value {
        CommandOptionValue::Focused(ref value, _) => Some(value.as_str()),
        _ => None,
    })
}

fn choice(name: String, value: String) -> CommandOptionChoice {
    CommandOptionChoice {
        name,
        name_localizations: None,
        value: CommandOptionChoiceValue::String(value),
    }
}

pub async fn autocomplete(ctx: AutocompleteCtx, data: CommandData) -> AutocompleteResult {
    let Some(query) = focused_query(&data) else {
        return Ok(ctx.respond_choices(Vec::new()).await?);
    };
    let query = query.trim();
    if query.is_empty() {
        return Ok(ctx.respond_choices(Vec::new()).await?);
    }

    // URLs pass straight through; resolving them here would waste the
    // interaction's short time budget
    if is_url(query) {
        let label = format!("Play from URL: {}", query.pretty_truncate(80));
        return Ok(ctx
            .respond_choices(vec![choice(label, query.to_owned())])
            .await?);
    }

    let Some(guild_id) = ctx.get_guild_id() else {
        return Ok(ctx.respond_choices(Vec::new()).await?);
    };

    if let Some(cached) = ctx.bot().search_cache().get(query).await {
        return Ok(ctx.respond_choices(cached.as_ref().clone()).await?);
    }

    let loaded = ctx
        .bot()
        .lavalink()
        .load_tracks(guild_id, &format!("ytsearch:{query}"))
        .await?;
    let tracks = match (loaded.load_type, loaded.data) {
        (TrackLoadType::Search, Some(TrackLoadData::Search(tracks))) => tracks,
        _ => Vec::new(),
    };

    let choices = tracks
        .into_iter()
        .take(konst::misc::AUTOCOMPLETE_LIMIT)
        .map(|track| {
            let duration = Duration::from_millis(track.info.length);
            let label = format!(
                "{} [{}]",
                track.info.title.pretty_truncate(80),
                duration.pretty_display()
            );
            let value = track.info.uri.unwrap_or(track.info.title);
            choice(label, value)
        })
        .collect::<Vec<_>>();

    ctx.bot()
        .search_cache()
        .insert(Box::from(query), Arc::new(choices.clone()))
        .await;
    ctx.respond_choices(choices).await?;
    Ok(())
}
