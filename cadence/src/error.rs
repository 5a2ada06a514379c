pub mod command;
pub mod gateway;
pub mod lavalink;
pub mod runner;

use thiserror::Error;
use twilight_mention::Mention;
use twilight_model::id::{marker::ChannelMarker, Id};

pub use command::Result as CommandResult;

/// A failed user-side precondition.
///
/// These are answered with an ephemeral explanation and are never treated
/// as faults: a command returning one of these has run normally.
#[derive(Error, Debug)]
pub enum UserError {
    #[error("not in a guild")]
    NotInGuild,
    #[error("user is not in a voice channel")]
    NotInVoice,
    #[error("user is not in the bot's voice channel: {}", .0)]
    NotInBotVoice(Id<ChannelMarker>),
    #[error("no active player")]
    NoPlayer,
    #[error("nothing is playing")]
    NotPlaying,
    #[error("queue is empty")]
    QueueEmpty,
    #[error("position is out of range 1..={}: {}", .queue_len, .position)]
    PositionOutOfRange { position: i64, queue_len: usize },
    #[error("user is not allowed to do this")]
    NotAllowed,
    #[error("no results for query: {}", .0)]
    NoResults(Box<str>),
    #[error("failed to load track: {}", .0)]
    LoadFailed(Box<str>),
    #[error("invalid timestamp: {}", .0)]
    InvalidTimestamp(Box<str>),
    #[error("playlist not found: {}", .0)]
    PlaylistNotFound(Box<str>),
    #[error("playlist name taken: {}", .0)]
    PlaylistNameTaken(Box<str>),
    #[error("playlist is empty: {}", .0)]
    PlaylistEmpty(Box<str>),
    #[error("share code not found: {}", .0)]
    ShareCodeNotFound(Box<str>),
    #[error("track is already a favorite: {}", .0)]
    AlreadyFavorite(Box<str>),
    #[error("favorite not found")]
    FavoriteNotFound,
    #[error("no grant exists for user")]
    GrantNotFound,
}

impl UserError {
    /// The reply shown to the invoker.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotInGuild => "❌ This can only be used in a server.".to_owned(),
            Self::NotInVoice => "❌ You need to be in a voice channel to do that.".to_owned(),
            Self::NotInBotVoice(channel_id) => {
                format!(
                    "❌ You must be in {} to control the player.",
                    channel_id.mention()
                )
            }
            Self::NoPlayer => "❌ Nothing is playing in this server.".to_owned(),
            Self::NotPlaying => "❌ No track is currently playing.".to_owned(),
            Self::QueueEmpty => "❌ The queue is empty.".to_owned(),
            Self::PositionOutOfRange { queue_len: 0, .. } => {
                "❌ There are no tracks to pick from.".to_owned()
            }
            Self::PositionOutOfRange {
                position,
                queue_len,
            } => {
                format!("❌ Position `{position}` is out of range `1` to `{queue_len}`.")
            }
            Self::NotAllowed => "🚫 You are not allowed to do that.".to_owned(),
            Self::NoResults(query) => format!("❌ No results found for `{query}`."),
            Self::LoadFailed(query) => format!("❌ Failed to load `{query}`."),
            Self::InvalidTimestamp(input) => {
                format!("❌ `{input}` is not a valid timestamp. Try `2:30` or `1m30s`.")
            }
            Self::PlaylistNotFound(name) => format!("❌ You have no playlist named `{name}`."),
            Self::PlaylistNameTaken(name) => {
                format!("❌ You already have a playlist named `{name}`.")
            }
            Self::PlaylistEmpty(name) => format!("❌ Playlist `{name}` has no tracks."),
            Self::ShareCodeNotFound(code) => format!("❌ No shared playlist matches `{code}`."),
            Self::AlreadyFavorite(title) => {
                format!("💔 `{title}` is already in your favorites.")
            }
            Self::FavoriteNotFound => "❌ No such favorite.".to_owned(),
            Self::GrantNotFound => "❌ That user has no active grant.".to_owned(),
        }
    }
}

#[derive(Error, Debug)]
#[error("error running the bot starter: {}", .0)]
pub enum Run {
    ColorEyre(#[from] color_eyre::Report),
    Start(#[from] runner::StartError),
}
