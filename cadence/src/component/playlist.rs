use std::time::Duration;

use cadence_ext::pretty::{duration_display::DurationDisplay, truncate::PrettyTruncator};
use itertools::Itertools;
use sqlx::{Pool, Sqlite};
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_util::builder::embed::EmbedBuilder;

use crate::{
    command::{model::BotSlashCommand, require, SlashCtx},
    core::model::{BotStateAware, DatabaseAware},
    db::{
        self,
        playlist::{NewTrack, Playlist as PlaylistRecord},
    },
    error::{CommandResult, UserError},
    gateway::{GuildIdAware, SenderAware},
    LavalinkAware,
};

/// Manage your playlists.
#[derive(CommandModel, CreateCommand)]
#[command(name = "playlist", desc = "Manage your playlists.", contexts = "guild")]
pub enum Playlist {
    #[command(name = "create")]
    Create(Create),
    #[command(name = "delete")]
    Delete(Delete),
    #[command(name = "list")]
    List(List),
    #[command(name = "view")]
    View(View),
    #[command(name = "save")]
    Save(Save),
    #[command(name = "add")]
    Add(Add),
    #[command(name = "remove-track")]
    RemoveTrack(RemoveTrack),
    #[command(name = "play")]
    Play(Play),
    #[command(name = "share")]
    Share(Share),
    #[command(name = "import")]
    Import(Import),
    #[command(name = "rename")]
    Rename(Rename),
}

impl BotSlashCommand for Playlist {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        match self {
            Self::Create(cmd) => cmd.run(ctx).await,
            Self::Delete(cmd) => cmd.run(ctx).await,
            Self::List(cmd) => cmd.run(ctx).await,
            Self::View(cmd) => cmd.run(ctx).await,
            Self::Save(cmd) => cmd.run(ctx).await,
            Self::Add(cmd) => cmd.run(ctx).await,
            Self::RemoveTrack(cmd) => cmd.run(ctx).await,
            Self::Play(cmd) => cmd.run(ctx).await,
            Self::Share(cmd) => cmd.run(ctx).await,
            Self::Import(cmd) => cmd.run(ctx).await,
            Self::Rename(cmd) => cmd.run(ctx).await,
        }
    }
}

async fn owned_playlist(
    db: &Pool<Sqlite>,
    user_id: &str,
    name: &str,
) -> Result<PlaylistRecord, crate::error::command::Error> {
    db::playlist::find_by_name(db, user_id, name)
        .await?
        .ok_or_else(|| UserError::PlaylistNotFound(name.into()).into())
}

async fn reject_name_taken(
    db: &Pool<Sqlite>,
    user_id: &str,
    name: &str,
) -> Result<(), crate::error::command::Error> {
    if db::playlist::find_by_name(db, user_id, name).await?.is_some() {
        return Err(UserError::PlaylistNameTaken(name.into()).into());
    }
    Ok(())
}

/// Creates an empty playlist.
#[derive(CommandModel, CreateCommand)]
#[command(name = "create", desc = "Creates an empty playlist.")]
pub struct Create {
    /// Name of the new playlist.
    name: String,
}

impl BotSlashCommand for Create {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();
        reject_name_taken(ctx.bot().db(), &user_id, &self.name).await?;

        db::playlist::create(ctx.bot().db(), &user_id, &self.name).await?;
        ctx.out(format!("📝 Created playlist **{}**.", self.name))
            .await?;
        Ok(())
    }
}

/// Deletes one of your playlists.
#[derive(CommandModel, CreateCommand)]
#[command(name = "delete", desc = "Deletes one of your playlists.")]
pub struct Delete {
    /// Name of the playlist to delete.
    name: String,
}

impl BotSlashCommand for Delete {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();
        let playlist = owned_playlist(ctx.bot().db(), &user_id, &self.name).await?;

        db::playlist::delete(ctx.bot().db(), playlist.id).await?;
        ctx.out(format!("🗑️ Deleted playlist **{}**.", self.name))
            .await?;
        Ok(())
    }
}

/// Lists your playlists.
#[derive(CommandModel, CreateCommand)]
#[command(name = "list", desc = "Lists your playlists.")]
pub struct List;

impl BotSlashCommand for List {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();

        let playlists = db::playlist::all_for_user(ctx.bot().db(), &user_id).await?;
        if playlists.is_empty() {
            ctx.hid("📝 You have no playlists yet. Try `/playlist create`.")
                .await?;
            return Ok(());
        }

        let mut description = String::new();
        for (index, playlist) in playlists.iter().enumerate() {
            let count = db::playlist::track_count(ctx.bot().db(), playlist.id).await?;
            description.push_str(&format!(
                "`{}.` **{}** — {count} track{}\n",
                index + 1,
                playlist.name,
                if count == 1 { "" } else { "s" },
            ));
        }

        let embed = EmbedBuilder::new()
            .title(format!("📝 Playlists — {}", playlists.len()))
            .description(description)
            .build();
        ctx.out_embed(embed).await?;
        Ok(())
    }
}

/// Shows the tracks of a playlist.
#[derive(CommandModel, CreateCommand)]
#[command(name = "view", desc = "Shows the tracks of a playlist.")]
pub struct View {
    /// Name of the playlist.
    name: String,
}

impl BotSlashCommand for View {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();
        let playlist = owned_playlist(ctx.bot().db(), &user_id, &self.name).await?;

        let tracks = db::playlist::tracks(ctx.bot().db(), playlist.id).await?;
        if tracks.is_empty() {
            return Err(UserError::PlaylistEmpty(self.name.into()).into());
        }

        const PAGE: usize = 25;
        let mut description = tracks
            .iter()
            .take(PAGE)
            .enumerate()
            .map(|(index, track)| {
                #[allow(clippy::cast_sign_loss)]
                let duration = Duration::from_millis(track.length as u64);
                format!(
                    "`{}.` {} — {} `[{}]`",
                    index + 1,
                    track.title.pretty_truncate(40),
                    track.author.pretty_truncate(20),
                    duration.pretty_display(),
                )
            })
            .join("\n");
        if tracks.len() > PAGE {
            description.push_str(&format!("\n… and {} more", tracks.len() - PAGE));
        }

        let embed = EmbedBuilder::new()
            .title(format!("📝 {} — {} tracks", playlist.name, tracks.len()))
            .description(description)
            .build();
        ctx.out_embed(embed).await?;
        Ok(())
    }
}

/// Saves the current queue as a new playlist.
#[derive(CommandModel, CreateCommand)]
#[command(name = "save", desc = "Saves the current queue as a new playlist.")]
pub struct Save {
    /// Name for the new playlist.
    name: String,
}

impl BotSlashCommand for Save {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();
        let player = require::player(&ctx)?;
        let data = player.data();

        reject_name_taken(ctx.bot().db(), &user_id, &self.name).await?;

        let data_r = data.read().await;
        require::queue_not_empty(&data_r)?;
        let snapshot = data_r
            .queue()
            .iter_all()
            .map(|item| {
                let info = &item.data().info;
                NewTrack {
                    title: info.title.clone(),
                    identifier: info.identifier.clone(),
                    author: info.author.clone(),
                    length: i64::try_from(info.length).unwrap_or(i64::MAX),
                    uri: info.uri.clone().unwrap_or_default(),
                    artwork_url: info.artwork_url.clone(),
                }
            })
            .collect::<Vec<_>>();
        drop(data_r);

        let playlist = db::playlist::create(ctx.bot().db(), &user_id, &self.name).await?;
        db::playlist::add_tracks(ctx.bot().db(), playlist.id, &snapshot).await?;

        ctx.out(format!(
            "💾 Saved **{}** tracks into playlist **{}**.",
            snapshot.len(),
            self.name
        ))
        .await?;
        Ok(())
    }
}

/// Adds a track to a playlist.
#[derive(CommandModel, CreateCommand)]
#[command(name = "add", desc = "Adds a track to a playlist.")]
pub struct Add {
    /// Name of the playlist.
    name: String,
    /// Search query or URL for the track to add.
    query: String,
}

impl BotSlashCommand for Add {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();
        let playlist = owned_playlist(ctx.bot().db(), &user_id, &self.name).await?;

        ctx.defer(false).await?;
        let term = if self.query.starts_with("http") {
            self.query.clone()
        } else {
            format!("ytsearch:{}", self.query)
        };
        let loaded = ctx.bot().lavalink().load_tracks(ctx.guild_id(), &term).await?;
        let track = super::favorite::first_track(loaded)
            .ok_or_else(|| UserError::NoResults(self.query.clone().into()))?;

        let new_track = NewTrack {
            title: track.info.title.clone(),
            identifier: track.info.identifier,
            author: track.info.author,
            length: i64::try_from(track.info.length).unwrap_or(i64::MAX),
            uri: track.info.uri.unwrap_or_default(),
            artwork_url: track.info.artwork_url,
        };
        db::playlist::add_tracks(ctx.bot().db(), playlist.id, std::slice::from_ref(&new_track))
            .await?;

        ctx.followup(&format!(
            "➕ Added `{}` to **{}**.",
            track.info.title, self.name
        ))
        .await?;
        Ok(())
    }
}

/// Removes a track from a playlist by position.
#[derive(CommandModel, CreateCommand)]
#[command(name = "remove-track", desc = "Removes a track from a playlist by position.")]
pub struct RemoveTrack {
    /// Name of the playlist.
    name: String,
    /// Position of the track to remove (see /playlist view).
    #[command(min_value = 1)]
    position: i64,
}

impl BotSlashCommand for RemoveTrack {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();
        let playlist = owned_playlist(ctx.bot().db(), &user_id, &self.name).await?;

        let tracks = db::playlist::tracks(ctx.bot().db(), playlist.id).await?;
        #[allow(clippy::cast_sign_loss)]
        let track = tracks
            .get((self.position as usize).wrapping_sub(1))
            .ok_or(UserError::PositionOutOfRange {
                position: self.position,
                queue_len: tracks.len(),
            })?;

        db::playlist::remove_track(ctx.bot().db(), track.id).await?;
        ctx.out(format!(
            "🗑️ Removed `{}` from **{}**. Positions after it have shifted.",
            track.title, self.name
        ))
        .await?;
        Ok(())
    }
}

/// Queues all tracks of a playlist.
#[derive(CommandModel, CreateCommand)]
#[command(name = "play", desc = "Queues all tracks of a playlist.")]
pub struct Play {
    /// Name of the playlist to play.
    name: String,
}

impl BotSlashCommand for Play {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let in_voice = require::in_voice(&ctx)?;
        let user_id = ctx.author_id().to_string();
        let playlist = owned_playlist(ctx.bot().db(), &user_id, &self.name).await?;

        let tracks = db::playlist::tracks(ctx.bot().db(), playlist.id).await?;
        if tracks.is_empty() {
            return Err(UserError::PlaylistEmpty(self.name.into()).into());
        }

        ctx.defer(false).await?;
        let guild_id = ctx.guild_id();
        let player = super::queue::ensure_player(
            ctx.bot(),
            ctx.sender(),
            guild_id,
            in_voice.channel_id,
            ctx.channel_id(),
        )
        .await?;

        // stored rows only carry URIs; each is re-resolved live so stale
        // entries degrade to a partial load instead of an error
        let lookups = tracks
            .iter()
            .filter(|track| !track.uri.is_empty())
            .map(|track| ctx.bot().lavalink().load_tracks(guild_id, &track.uri));
        let resolved = futures::future::join_all(lookups)
            .await
            .into_iter()
            .filter_map(|loaded| loaded.ok().and_then(super::favorite::first_track))
            .collect::<Vec<_>>();

        if resolved.is_empty() {
            ctx.followup("❌ None of that playlist's tracks could be loaded.")
                .await?;
            return Ok(());
        }

        let loaded_count = resolved.len();
        super::queue::enqueue_tracks(&player, resolved, ctx.author_id()).await?;
        ctx.followup(&format!(
            "🎵 Queued **{loaded_count}** of **{}** tracks from **{}**.",
            tracks.len(),
            self.name
        ))
        .await?;
        Ok(())
    }
}

/// Shares a playlist via a code.
#[derive(CommandModel, CreateCommand)]
#[command(name = "share", desc = "Shares a playlist via a code.")]
pub struct Share {
    /// Name of the playlist to share.
    name: String,
}

impl BotSlashCommand for Share {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();
        let playlist = owned_playlist(ctx.bot().db(), &user_id, &self.name).await?;

        let code = db::playlist::ensure_share_code(ctx.bot().db(), &playlist).await?;
        ctx.hid(format!(
            "🔗 Share code for **{}**: `{code}` — others can import it with `/playlist import`.",
            self.name
        ))
        .await?;
        Ok(())
    }
}

/// Imports a playlist shared by someone else.
#[derive(CommandModel, CreateCommand)]
#[command(name = "import", desc = "Imports a playlist shared by someone else.")]
pub struct Import {
    /// The share code.
    code: String,
}

impl BotSlashCommand for Import {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();

        let source = db::playlist::find_by_share_code(ctx.bot().db(), &self.code)
            .await?
            .ok_or_else(|| UserError::ShareCodeNotFound(self.code.clone().into()))?;
        reject_name_taken(ctx.bot().db(), &user_id, &source.name).await?;

        let tracks = db::playlist::tracks(ctx.bot().db(), source.id).await?;
        let copies = tracks
            .iter()
            .map(|track| NewTrack {
                title: track.title.clone(),
                identifier: track.identifier.clone(),
                author: track.author.clone(),
                length: track.length,
                uri: track.uri.clone(),
                artwork_url: track.artwork_url.clone(),
            })
            .collect::<Vec<_>>();

        let imported = db::playlist::create(ctx.bot().db(), &user_id, &source.name).await?;
        db::playlist::add_tracks(ctx.bot().db(), imported.id, &copies).await?;

        ctx.out(format!(
            "📥 Imported **{}** with **{}** tracks.",
            source.name,
            copies.len()
        ))
        .await?;
        Ok(())
    }
}

/// Renames one of your playlists.
#[derive(CommandModel, CreateCommand)]
#[command(name = "rename", desc = "Renames one of your playlists.")]
pub struct Rename {
    /// Current name of the playlist.
    name: String,
    /// The new name.
    new_name: String,
}

impl BotSlashCommand for Rename {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let user_id = ctx.author_id().to_string();
        let playlist = owned_playlist(ctx.bot().db(), &user_id, &self.name).await?;
        reject_name_taken(ctx.bot().db(), &user_id, &self.new_name).await?;

        db::playlist::rename(ctx.bot().db(), playlist.id, &self.new_name).await?;
        ctx.out(format!(
            "✏️ Renamed **{}** to **{}**.",
            self.name, self.new_name
        ))
        .await?;
        Ok(())
    }
}
