use thiserror::Error;

use super::UserError;

#[derive(Error, Debug)]
#[error(transparent)]
pub enum Error {
    User(#[from] UserError),
    TwilightHttp(#[from] twilight_http::Error),
    Sqlx(#[from] sqlx::Error),
    Lavalink(#[from] lavalink_rs::error::LavalinkError),
    GatewaySend(#[from] twilight_gateway::error::ChannelError),
    NewNowPlayingMessage(#[from] super::lavalink::NewNowPlayingMessageError),
}

pub type Result = std::result::Result<(), Error>;

#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("unknown command: {}", .0)]
    UnknownCommand(Box<str>),
    #[error("parsing command options failed: {}", .0)]
    Parse(#[from] twilight_interactions::error::ParseError),
    #[error(transparent)]
    Command(#[from] Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub enum AutocompleteError {
    TwilightHttp(#[from] twilight_http::Error),
    Lavalink(#[from] lavalink_rs::error::LavalinkError),
}

pub type AutocompleteResult = std::result::Result<(), AutocompleteError>;
