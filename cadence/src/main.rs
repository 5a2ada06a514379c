mod command;
mod component;
mod core;
mod db;
mod error;
mod gateway;
mod health;
mod lavalink;
mod runner;

use lavalink_rs::player_context::PlayerContext;
use tracing_subscriber::EnvFilter;

use crate::{gateway::GuildIdAware, lavalink::Lavalink};

pub trait LavalinkAware {
    fn lavalink(&self) -> &Lavalink;
}

pub trait LavalinkAndGuildIdAware: LavalinkAware + GuildIdAware {
    fn get_player(&self) -> Option<PlayerContext> {
        self.lavalink().get_player_context(self.guild_id())
    }
}

impl<T: LavalinkAware + GuildIdAware> LavalinkAndGuildIdAware for T {}

#[tokio::main]
async fn main() -> Result<(), error::Run> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    runner::start().await?;
    Ok(())
}
