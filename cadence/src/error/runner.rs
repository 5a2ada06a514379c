use thiserror::Error;

#[derive(Error, Debug)]
#[error("starting the bot failed: {}", .0)]
pub enum StartError {
    Env(#[from] std::env::VarError),
    Sqlx(#[from] sqlx::Error),
    Migrate(#[from] sqlx::migrate::MigrateError),
    TwilightHttp(#[from] twilight_http::Error),
    DeserializeBody(#[from] twilight_http::response::DeserializeBodyError),
    StartRecommended(#[from] twilight_gateway::error::StartRecommendedError),
}
