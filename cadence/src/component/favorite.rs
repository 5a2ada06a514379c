use std::time::Duration;

use cadence_ext::pretty::{duration_display::DurationDisplay, truncate::PrettyTruncator};
use itertools::Itertools;
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_util::builder::embed::EmbedBuilder;

use crate::{
    command::{
        model::{BotSlashCommand, ComponentMarker, GuildCtx},
        require, SlashCtx,
    },
    core::model::{BotStateAware, DatabaseAware},
    db,
    error::{command::Error, CommandResult, UserError},
    gateway::{GuildIdAware, SenderAware},
    lavalink::OwnedPlayerData,
    LavalinkAware,
};

/// Manage your favorite tracks.
#[derive(CommandModel, CreateCommand)]
#[command(name = "favorite", desc = "Manage your favorite tracks.", contexts = "guild")]
pub enum Favorite {
    #[command(name = "add")]
    Add(Add),
    #[command(name = "remove")]
    Remove(Remove),
    #[command(name = "list")]
    List(List),
    #[command(name = "play")]
    Play(Play),
}

impl BotSlashCommand for Favorite {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        match self {
            Self::Add(cmd) => cmd.run(ctx).await,
            Self::Remove(cmd) => cmd.run(ctx).await,
            Self::List(cmd) => cmd.run(ctx).await,
            Self::Play(cmd) => cmd.run(ctx).await,
        }
    }
}

struct TrackSnapshot {
    identifier: String,
    title: String,
    author: String,
    length: i64,
    uri: String,
}

async fn save_favorite(
    db: &sqlx::Pool<sqlx::Sqlite>,
    user_id: &str,
    track: &TrackSnapshot,
) -> Result<(), Error> {
    if db::favorite::find(db, user_id, &track.identifier).await?.is_some() {
        return Err(UserError::AlreadyFavorite(track.title.clone().into()).into());
    }
    db::favorite::insert(
        db,
        user_id,
        &track.identifier,
        &track.title,
        &track.author,
        track.length,
        &track.uri,
    )
    .await?;
    Ok(())
}

fn snapshot_current(data_r: &crate::lavalink::PlayerDataRead<'_>) -> Result<TrackSnapshot, UserError> {
    let track = require::current_track(data_r.queue())?;
    let info = &track.data().info;
    Ok(TrackSnapshot {
        identifier: info.identifier.clone(),
        title: info.title.clone(),
        author: info.author.clone(),
        length: i64::try_from(info.length).unwrap_or(i64::MAX),
        uri: info.uri.clone().unwrap_or_default(),
    })
}

/// Adds the current track (pressed from the controller) to the pressing
/// user's favorites.
pub async fn add_current(
    ctx: &mut GuildCtx<ComponentMarker>,
    data: OwnedPlayerData,
) -> Result<(), Error> {
    let data_r = data.read().await;
    let snapshot = snapshot_current(&data_r)?;
    drop(data_r);

    let user_id = ctx.author_id().to_string();
    match save_favorite(ctx.bot().db(), &user_id, &snapshot).await {
        Ok(()) => {
            ctx.hid(format!("❤️ Added `{}` to your favorites.", snapshot.title))
                .await?;
            Ok(())
        }
        Err(Error::User(e)) => {
            ctx.hid(e.user_message()).await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Adds a track to your favorites.
#[derive(CommandModel, CreateCommand)]
#[command(name = "add", desc = "Adds a track to your favorites.")]
pub struct Add {
    /// Search query; omit to favorite the current track.
    query: Option<String>,
}

impl BotSlashCommand for Add {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();

        let snapshot = if let Some(ref query) = self.query {
            ctx.defer(false).await?;
            let loaded = ctx
                .bot()
                .lavalink()
                .load_tracks(
                    ctx.guild_id(),
                    &if query.starts_with("http") {
                        query.clone()
                    } else {
                        format!("ytsearch:{query}")
                    },
                )
                .await?;
            let track = first_track(loaded).ok_or_else(|| UserError::NoResults(query.clone().into()))?;
            TrackSnapshot {
                identifier: track.info.identifier,
                title: track.info.title,
                author: track.info.author,
                length: i64::try_from(track.info.length).unwrap_or(i64::MAX),
                uri: track.info.uri.unwrap_or_default(),
            }
        } else {
            let player = require::player(&ctx)?;
            let data = player.data();
            let data_r = data.read().await;
            snapshot_current(&data_r)?
        };

        save_favorite(ctx.bot().db(), &user_id, &snapshot).await?;
        ctx.out_or_followup(&format!("❤️ Added `{}` to your favorites.", snapshot.title))
            .await?;
        Ok(())
    }
}

pub(super) fn first_track(
    loaded: lavalink_rs::model::track::Track,
) -> Option<lavalink_rs::model::track::TrackData> {
    use lavalink_rs::model::track::{TrackLoadData, TrackLoadType};
    match (loaded.load_type, loaded.data) {
        (TrackLoadType::Track, Some(TrackLoadData::Track(track))) => Some(track),
        (TrackLoadType::Search, Some(TrackLoadData::Search(tracks))) => tracks.into_iter().next(),
        (TrackLoadType::Playlist, Some(TrackLoadData::Playlist(playlist))) => {
            playlist.tracks.into_iter().next()
        }
        _ => None,
    }
}

/// Removes a favorite by its list position.
#[derive(CommandModel, CreateCommand)]
#[command(name = "remove", desc = "Removes a favorite by its list position.")]
pub struct Remove {
    /// Position in your favorites list.
    #[command(min_value = 1)]
    position: i64,
}

impl BotSlashCommand for Remove {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();

        let favorites = db::favorite::all_for_user(ctx.bot().db(), &user_id).await?;
        #[allow(clippy::cast_sign_loss)]
        let favorite = favorites
            .get((self.position as usize).wrapping_sub(1))
            .ok_or(UserError::PositionOutOfRange {
                position: self.position,
                queue_len: favorites.len(),
            })?;

        db::favorite::remove(ctx.bot().db(), &user_id, &favorite.identifier).await?;
        ctx.out(format!("💔 Removed `{}` from your favorites.", favorite.title))
            .await?;
        Ok(())
    }
}

/// Lists your favorites.
#[derive(CommandModel, CreateCommand)]
#[command(name = "list", desc = "Lists your favorites.")]
pub struct List;

impl BotSlashCommand for List {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();

        let favorites = db::favorite::all_for_user(ctx.bot().db(), &user_id).await?;
        if favorites.is_empty() {
            ctx.hid("💔 You have no favorites yet. Try `/favorite add`.")
                .await?;
            return Ok(());
        }

        let description = favorites
            .iter()
            .enumerate()
            .map(|(index, favorite)| {
                #[allow(clippy::cast_sign_loss)]
                let duration = Duration::from_millis(favorite.length as u64);
                format!(
                    "`{}.` {} — {} `[{}]`",
                    index + 1,
                    favorite.title.pretty_truncate(40),
                    favorite.author.pretty_truncate(20),
                    duration.pretty_display(),
                )
            })
            .join("\n");

        let embed = EmbedBuilder::new()
            .title(format!("❤️ Favorites — {}", favorites.len()))
            .description(description)
            .build();
        ctx.out_embed(embed).await?;
        Ok(())
    }
}

/// Queues one or all of your favorites.
#[derive(CommandModel, CreateCommand)]
#[command(name = "play", desc = "Queues one or all of your favorites.")]
pub struct Play {
    /// Position of the favorite to play; omit to queue them all.
    #[command(min_value = 1)]
    position: Option<i64>,
}

impl BotSlashCommand for Play {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let in_voice = require::in_voice(&ctx)?;
        let user_id = ctx.author_id().to_string();

        let favorites = db::favorite::all_for_user(ctx.bot().db(), &user_id).await?;
        if favorites.is_empty() {
            return Err(UserError::FavoriteNotFound.into());
        }

        let selected = match self.position {
            Some(position) => {
                #[allow(clippy::cast_sign_loss)]
                let favorite = favorites
                    .get((position as usize).wrapping_sub(1))
                    .ok_or(UserError::PositionOutOfRange {
                        position,
                        queue_len: favorites.len(),
                    })?;
                vec![favorite.clone()]
            }
            None => favorites,
        };

        ctx.defer(false).await?;
        let guild_id = ctx.guild_id();
        let player = crate::component::queue::ensure_player(
            ctx.bot(),
            ctx.sender(),
            guild_id,
            in_voice.channel_id,
            ctx.channel_id(),
        )
        .await?;

        // favorites store bare URIs, so each one is re-resolved live;
        // dead links are skipped rather than failing the batch
        let lookups = selected
            .iter()
            .filter(|favorite| !favorite.uri.is_empty())
            .map(|favorite| ctx.bot().lavalink().load_tracks(guild_id, &favorite.uri));
        let resolved = futures::future::join_all(lookups)
            .await
            .into_iter()
            .filter_map(|loaded| loaded.ok().and_then(first_track))
            .collect::<Vec<_>>();

        if resolved.is_empty() {
            ctx.followup("❌ None of those favorites could be loaded.")
                .await?;
            return Ok(());
        }

        let count = resolved.len();
        let requested = selected.len();
        crate::component::queue::enqueue_tracks(&player, resolved, ctx.author_id()).await?;

        let message = if count == requested {
            format!("❤️ Queued **{count}** favorite{}.", if count == 1 { "" } else { "s" })
        } else {
            format!("❤️ Queued **{count}** of **{requested}** favorites (the rest no longer resolve).")
        };
        ctx.followup(&message).await?;
        Ok(())
    }
}
