use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_model::application::{
    command::Command, interaction::application_command::CommandData,
};

use crate::{
    command::{model::BotSlashCommand, SlashCtx},
    component::{
        connection::{Join, Leave},
        favorite::Favorite,
        misc::{Lyrics, NowPlaying, Ping, Stats},
        noprefix::NoPrefix,
        playback::{PlayPause, Seek, Skip, Stop},
        playlist::Playlist,
        queue::{Autoplay, Clear, Move, Play, Queue, Remove, Repeat, Shuffle},
        tuning::{Filter, Volume},
    },
    core::model::BotState,
    error::command::ExecuteError,
};

macro_rules! declare_slash_commands {
    ($( $cmd:ident ),* $(,)?) => {
        fn slash_commands() -> Vec<Command> {
            vec![$(<$cmd>::create_command().into(),)*]
        }

        impl SlashCtx {
            pub async fn execute(self, data: CommandData) -> Result<(), ExecuteError> {
                let name = data.name.clone();
                match name.as_str() {
                    $(
                        name if name == <$cmd as CreateCommand>::NAME => {
                            Ok(<$cmd>::from_interaction(data.into())?.run(self).await?)
                        }
                    )*
                    _ => Err(ExecuteError::UnknownCommand(name.into())),
                }
            }
        }
    };
}

declare_slash_commands![
    Play, Join, Leave, PlayPause, Skip, Seek, Stop, Queue, Remove, Move, Clear, Shuffle, Repeat,
    Autoplay, Volume, Filter, NowPlaying, Lyrics, Ping, Stats, Favorite, Playlist, NoPrefix,
];

/// Registers the global command set once at startup.
///
/// # Errors
/// When the registration request fails.
pub async fn register_global_commands(bot: &BotState) -> Result<(), twilight_http::Error> {
    bot.interaction()
        .set_global_commands(&slash_commands())
        .await?;
    Ok(())
}
