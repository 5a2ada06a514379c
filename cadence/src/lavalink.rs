mod autoplay;
mod model;
mod process;
mod track;

pub use self::{
    model::{
        ClientData, Lavalink, LastPlayed, NowPlayingData, NowPlayingMessage, NowPlayingUpdate,
        OwnedClientData, OwnedPlayerData, PlayerData, PlayerDataRead, PlayerDataWrite, Queue,
        QueueItem, RawPlayerData, RepeatMode, UnwrappedData, close_session, spawn_refresh,
    },
    process::handlers,
};
