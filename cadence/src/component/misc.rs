mod lyrics;
mod now_playing;
mod ping;
mod stats;

pub use self::{
    lyrics::{lyrics_embed_for, Lyrics},
    now_playing::NowPlaying,
    ping::Ping,
    stats::Stats,
};
