mod interaction;
mod message;
mod model;
mod voice;

use twilight_gateway::{Event, Latency, MessageSender};

use crate::{core::model::OwnedBotState, error::gateway::ProcessResult};

pub use model::{GuildIdAware, OptionallyGuildIdAware, Process, SenderAware};

pub async fn process(
    bot: OwnedBotState,
    event: Event,
    latency: Latency,
    sender: MessageSender,
) -> ProcessResult {
    match event {
        Event::Ready(ready) => {
            tracing::info!("logged in as {}", ready.user.name);
            Ok(())
        }
        Event::GuildCreate(_) => {
            bot.info().increment_guild_count();
            Ok(())
        }
        Event::GuildDelete(_) => {
            bot.info().decrement_guild_count();
            Ok(())
        }
        Event::InteractionCreate(inner) => {
            interaction::Context::new(inner, bot, latency, sender)
                .process()
                .await
        }
        Event::MessageCreate(inner) => message::process(bot, *inner, sender).await,
        Event::VoiceStateUpdate(inner) => voice::Context::new(inner, bot, sender).process().await,
        _ => Ok(()),
    }
}
