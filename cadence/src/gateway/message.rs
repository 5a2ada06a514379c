use std::num::NonZeroU16;

use cadence_ext::pretty::duration_display::DurationDisplay;
use twilight_gateway::MessageSender;
use twilight_model::{
    gateway::payload::incoming::MessageCreate,
    id::{
        marker::{ChannelMarker, GuildMarker, UserMarker},
        Id,
    },
};

use crate::{
    command::require::PlayerInterface,
    component::{connection, queue},
    core::model::{BotState, CacheAware, ConfigAware, DatabaseAware, HttpAware, OwnedBotState},
    db,
    error::{command::Error, gateway::ProcessResult, UserError},
    lavalink::{NowPlayingUpdate, OwnedPlayerData, UnwrappedData},
    LavalinkAware,
};

/// Message-command dispatch: prefixed invocations from anyone, bare ones
/// from users holding an unexpired no-prefix grant.
pub(super) async fn process(
    bot: OwnedBotState,
    event: MessageCreate,
    sender: MessageSender,
) -> ProcessResult {
    if event.author.bot {
        return Ok(());
    }
    let Some(guild_id) = event.guild_id else {
        return Ok(());
    };

    let content = event.content.trim();
    let prefix = bot.config().prefix.clone();
    let body = if let Some(stripped) = content.strip_prefix(prefix.as_str()) {
        stripped.trim()
    } else if db::no_prefix::is_active(bot.db(), &event.author.id.to_string()).await? {
        content
    } else {
        return Ok(());
    };
    if body.is_empty() {
        return Ok(());
    }

    let (word, args) = body
        .split_once(char::is_whitespace)
        .map_or((body, ""), |(word, rest)| (word, rest.trim()));
    let word = word.to_ascii_lowercase();

    let cx = PrefixCtx {
        bot: &bot,
        guild_id,
        channel_id: event.channel_id,
        author_id: event.author.id,
        sender: &sender,
    };

    let result = match word.as_str() {
        "play" | "p" => cx.play(args).await,
        "skip" | "s" | "next" => cx.skip().await,
        "pause" => cx.pause(true).await,
        "resume" | "unpause" => cx.pause(false).await,
        "stop" | "leave" | "disconnect" | "dc" => cx.stop().await,
        "queue" | "q" => cx.queue().await,
        "nowplaying" | "np" => cx.now_playing().await,
        "loop" => cx.cycle_loop().await,
        "shuffle" => cx.shuffle().await,
        "autoplay" | "ap" => cx.autoplay().await,
        "volume" | "vol" => cx.volume(args).await,
        "ping" => cx.reply("🏓 Pong!").await,
        // anything else is ordinary chatter, especially for no-prefix users
        _ => return Ok(()),
    };

    match result {
        Err(Error::User(user_error)) => {
            cx.reply(&user_error.user_message()).await?;
            Ok(())
        }
        other => Ok(other?),
    }
}

struct PrefixCtx<'a> {
    bot: &'a BotState,
    guild_id: Id<GuildMarker>,
    channel_id: Id<ChannelMarker>,
    author_id: Id<UserMarker>,
    sender: &'a MessageSender,
}

impl PrefixCtx<'_> {
    async fn reply(&self, content: &str) -> Result<(), Error> {
        self.bot
            .http()
            .create_message(self.channel_id)
            .content(content)
            .await?;
        Ok(())
    }

    fn author_voice_channel(&self) -> Result<Id<ChannelMarker>, UserError> {
        self.bot
            .cache()
            .voice_state(self.author_id, self.guild_id)
            .map(|state| state.channel_id())
            .ok_or(UserError::NotInVoice)
    }

    fn require_same_channel(&self) -> Result<(), UserError> {
        let bot_channel = self
            .bot
            .cache()
            .voice_state(self.bot.user_id(), self.guild_id)
            .map(|state| state.channel_id())
            .ok_or(UserError::NoPlayer)?;
        if self.author_voice_channel().ok() != Some(bot_channel) {
            return Err(UserError::NotInBotVoice(bot_channel));
        }
        Ok(())
    }

    fn player(&self) -> Result<PlayerInterface, UserError> {
        let context = self
            .bot
            .lavalink()
            .get_player_context(self.guild_id)
            .ok_or(UserError::NoPlayer)?;
        Ok(PlayerInterface { context })
    }

    fn player_data(&self) -> Result<OwnedPlayerData, UserError> {
        Ok(self.player()?.context.data_unwrapped())
    }

    async fn play(&self, args: &str) -> Result<(), Error> {
        if args.is_empty() {
            return self.reply("❓ Usage: `play <song or URL>`").await;
        }
        let voice_channel = self.author_voice_channel()?;
        let player = queue::ensure_player(
            self.bot,
            self.sender,
            self.guild_id,
            voice_channel,
            self.channel_id,
        )
        .await?;
        let enqueued =
            queue::play_query(self.bot, &player, self.guild_id, self.author_id, args).await?;
        self.reply(&enqueued.to_string()).await
    }

    async fn skip(&self) -> Result<(), Error> {
        self.require_same_channel()?;
        let player = self.player()?;
        let data = player.data();
        let mut data_w = data.write().await;
        let skipped = data_w
            .queue()
            .current()
            .map(|item| item.data().info.title.clone())
            .ok_or(UserError::NotPlaying)?;
        player.skip_with(&mut data_w).await?;
        drop(data_w);
        self.reply(&format!("⏭️ Skipped `{skipped}`.")).await
    }

    async fn pause(&self, pause: bool) -> Result<(), Error> {
        self.require_same_channel()?;
        let player = self.player()?;
        let data = player.data();
        let mut data_w = data.write().await;
        player.set_pause_with(pause, &mut data_w).await?;
        if let Err(error) = data_w.update_now_playing(NowPlayingUpdate::Paused(pause)).await {
            tracing::debug!(%error, "updating now-playing pause state failed");
        }
        drop(data_w);
        self.reply(if pause { "⏸️ Paused." } else { "▶️ Resumed." })
            .await
    }

    async fn stop(&self) -> Result<(), Error> {
        self.require_same_channel()?;
        self.player()?;
        connection::destroy_session(self.bot, self.guild_id).await;
        connection::disconnect(self.sender, self.guild_id)?;
        self.reply("⏹️ Stopped music and cleared the queue.").await
    }

    async fn queue(&self) -> Result<(), Error> {
        let data = self.player_data()?;
        let data_r = data.read().await;
        if data_r.queue().total_len() == 0 {
            return Err(UserError::QueueEmpty.into());
        }
        let embed = queue::view_queue(&data_r);
        drop(data_r);
        self.bot
            .http()
            .create_message(self.channel_id)
            .embeds(&[embed])
            .await?;
        Ok(())
    }

    async fn now_playing(&self) -> Result<(), Error> {
        let data = self.player_data()?;
        let data_r = data.read().await;
        let track = data_r.queue().current().ok_or(UserError::NotPlaying)?;
        let info = &track.data().info;
        let message = format!(
            "🎵 `{}` — `{} / {}` 🔊 {}",
            info.title,
            data_r.timestamp().pretty_display(),
            std::time::Duration::from_millis(info.length).pretty_display(),
            data_r.volume(),
        );
        drop(data_r);
        self.reply(&message).await
    }

    async fn cycle_loop(&self) -> Result<(), Error> {
        self.require_same_channel()?;
        let data = self.player_data()?;
        let mut data_w = data.write().await;
        let mode = data_w.queue().repeat_mode().next();
        data_w.queue_mut().set_repeat_mode(mode);
        if let Err(error) = data_w.update_now_playing(NowPlayingUpdate::Repeat(mode)).await {
            tracing::debug!(%error, "updating now-playing repeat mode failed");
        }
        drop(data_w);
        self.reply(&format!("{} {}.", mode.emoji(), mode.description()))
            .await
    }

    async fn shuffle(&self) -> Result<(), Error> {
        self.require_same_channel()?;
        let data = self.player_data()?;
        let mut data_w = data.write().await;
        if data_w.queue().is_empty() {
            return Err(UserError::QueueEmpty.into());
        }
        data_w.queue_mut().shuffle(&mut rand::rng());
        drop(data_w);
        self.reply("🔀 Queue shuffled.").await
    }

    async fn autoplay(&self) -> Result<(), Error> {
        self.require_same_channel()?;
        let data = self.player_data()?;
        let mut data_w = data.write().await;
        let enabled = data_w.toggle_autoplay();
        if let Err(error) = data_w
            .update_now_playing(NowPlayingUpdate::Autoplay(enabled))
            .await
        {
            tracing::debug!(%error, "updating now-playing autoplay state failed");
        }
        drop(data_w);
        self.reply(if enabled {
            "♾️ Autoplay enabled."
        } else {
            "♾️ Autoplay disabled."
        })
        .await
    }

    async fn volume(&self, args: &str) -> Result<(), Error> {
        self.require_same_channel()?;
        let Some(level) = args
            .parse::<u16>()
            .ok()
            .filter(|level| (1..=100).contains(level))
            .and_then(NonZeroU16::new)
        else {
            return self.reply("❓ Usage: `volume <1-100>`").await;
        };
        let player = self.player()?;
        let data = player.data();
        let mut data_w = data.write().await;
        player.set_volume_with(level, &mut data_w).await?;
        drop(data_w);
        self.reply(&format!("🔊 Volume set to **{level}**.")).await
    }
}
