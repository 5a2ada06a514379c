use thiserror::Error;

#[derive(Error, Debug)]
#[error(transparent)]
pub enum BuildNowPlayingError {
    ImageSourceUrl(#[from] twilight_util::builder::embed::image_source::ImageSourceUrlError),
    TimestampParse(#[from] twilight_model::util::datetime::TimestampParseError),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub enum NewNowPlayingMessageError {
    Build(#[from] BuildNowPlayingError),
    TwilightHttp(#[from] twilight_http::Error),
    DeserializeBody(#[from] twilight_http::response::DeserializeBodyError),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub enum UpdateNowPlayingMessageError {
    Build(#[from] BuildNowPlayingError),
    TwilightHttp(#[from] twilight_http::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub enum ProcessError {
    Lavalink(#[from] lavalink_rs::error::LavalinkError),
    NewNowPlayingMessage(#[from] NewNowPlayingMessageError),
}

pub type ProcessResult = Result<(), ProcessError>;
