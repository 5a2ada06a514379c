use twilight_cache_inmemory::InMemoryCache;
use twilight_gateway::MessageSender;
use twilight_model::{
    gateway::payload::{incoming::VoiceStateUpdate, outgoing::UpdateVoiceState},
    id::{
        marker::{ChannelMarker, GuildMarker, UserMarker},
        Id,
    },
};

use crate::{
    core::{
        konst::connection::INACTIVITY_TIMEOUT,
        model::{CacheAware, HttpAware, OwnedBotState},
    },
    error::gateway::ProcessResult,
    gateway::model::Process,
    lavalink::{close_session, UnwrappedData},
    LavalinkAware,
};

pub(super) struct Context {
    inner: Box<VoiceStateUpdate>,
    bot: OwnedBotState,
    sender: MessageSender,
}

impl Context {
    pub(super) const fn new(
        inner: Box<VoiceStateUpdate>,
        bot: OwnedBotState,
        sender: MessageSender,
    ) -> Self {
        Self { inner, bot, sender }
    }

    fn guild_id(&self) -> Id<GuildMarker> {
        self.inner
            .guild_id
            .expect("bots can only observe guild voice states")
    }
}

/// Whether any non-bot member is in the channel besides nobody at all.
fn someone_listening(
    cache: &InMemoryCache,
    channel_id: Id<ChannelMarker>,
    bot_id: Id<UserMarker>,
) -> bool {
    cache
        .voice_channel_states(channel_id)
        .is_some_and(|states| {
            states
                .filter(|state| state.user_id() != bot_id)
                .any(|state| {
                    cache
                        .user(state.user_id())
                        .is_some_and(|user| !user.bot)
                })
        })
}

impl Process for Context {
    async fn process(self) -> ProcessResult {
        let guild_id = self.guild_id();
        let bot_id = self.bot.user_id();

        let Some(player) = self.bot.lavalink().get_player_context(guild_id) else {
            return Ok(());
        };
        let data = player.data_unwrapped();

        // the bot itself was disconnected: tear everything down right away
        if self.inner.user_id == bot_id && self.inner.channel_id.is_none() {
            self.bot.idle_timeouts().cancel(guild_id).await;

            let channel_id = data.read().await.text_channel_id();
            let _ = self
                .bot
                .http()
                .create_message(channel_id)
                .content("🔌 I was disconnected from the voice channel. Clearing the queue.")
                .await;

            close_session(&data).await;
            if let Err(error) = self.bot.lavalink().delete_player(guild_id).await {
                tracing::warn!(%error, "deleting player after forced disconnect failed");
            }
            return Ok(());
        }

        let Some(bot_channel) = self
            .bot
            .cache()
            .voice_state(bot_id, guild_id)
            .map(|state| state.channel_id())
        else {
            return Ok(());
        };

        if someone_listening(self.bot.cache(), bot_channel, bot_id) {
            self.bot.idle_timeouts().cancel(guild_id).await;
            return Ok(());
        }

        if self.bot.idle_timeouts().contains(guild_id).await {
            return Ok(());
        }

        let bot = self.bot.clone();
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(INACTIVITY_TIMEOUT).await;
            bot.idle_timeouts().forget(guild_id).await;

            // membership may have changed while the timer slept; this
            // re-check closes the race with the cancel path
            let Some(player) = bot.lavalink().get_player_context(guild_id) else {
                return;
            };
            let Some(bot_channel) = bot
                .cache()
                .voice_state(bot.user_id(), guild_id)
                .map(|state| state.channel_id())
            else {
                return;
            };
            if someone_listening(bot.cache(), bot_channel, bot.user_id()) {
                return;
            }

            let data = player.data_unwrapped();
            let channel_id = data.read().await.text_channel_id();
            let _ = bot
                .http()
                .create_message(channel_id)
                .content("💤 Left the voice channel due to inactivity. No one was listening.")
                .await;

            close_session(&data).await;
            if let Err(error) = bot.lavalink().delete_player(guild_id).await {
                tracing::warn!(%error, "deleting player after idle timeout failed");
            }
            let _ = sender.command(&UpdateVoiceState::new(guild_id, None, false, false));
        });
        self.bot.idle_timeouts().insert(guild_id, handle).await;

        Ok(())
    }
}
