use std::{sync::Arc, time::Duration};

use cadence_ext::{image::dominant_palette, pretty::duration_display::DurationDisplay};
use twilight_http::Client;
use twilight_model::{
    channel::message::{
        component::{ActionRow, Button, ButtonStyle},
        Component, EmojiReactionType,
    },
    id::{
        marker::{ChannelMarker, GuildMarker, MessageMarker},
        Id,
    },
};
use twilight_util::builder::embed::{
    EmbedAuthorBuilder, EmbedBuilder, EmbedFooterBuilder, ImageSource,
};

use crate::{
    command::util::requester_display,
    core::statik::component::ControllerButton,
    error::lavalink::{
        BuildNowPlayingError, NewNowPlayingMessageError, UpdateNowPlayingMessageError,
    },
};

use super::{ClientData, PlayerDataRead, QueueItem, RepeatMode};

const DEFAULT_ACCENT: u32 = 0x5865_F2;

#[derive(Clone)]
struct Artwork {
    url: Box<str>,
    colour: u32,
}

/// Everything the now-playing message renders, snapshotted so refresh
/// edits do not have to re-read caches.
pub struct Data {
    paused: bool,
    title: Box<str>,
    url: Option<Box<str>>,
    artist: Box<str>,
    queue_len: usize,
    timestamp: Duration,
    duration: Duration,
    enqueued: Duration,
    requester_name: Box<str>,
    requester_avatar: Option<Box<str>>,
    repeat_mode: RepeatMode,
    autoplay: bool,
    artwork: Option<Artwork>,
}

impl Data {
    async fn artwork_colour(client_data: &ClientData, url: &str) -> u32 {
        client_data
            .palette_cache()
            .get_with(Box::from(url), async {
                let bytes = reqwest::get(url).await.ok()?.bytes().await.ok()?;
                dominant_palette::from_bytes(&bytes, 4)
                    .ok()
                    .and_then(|palette| palette.first().copied())
            })
            .await
            .unwrap_or(DEFAULT_ACCENT)
    }

    pub async fn new(
        client_data: &ClientData,
        guild_id: Id<GuildMarker>,
        data: &PlayerDataRead<'_>,
        track: &QueueItem,
    ) -> Self {
        let info = &track.data().info;
        let (requester_name, requester_avatar) =
            requester_display(client_data, guild_id, track.requester());

        let artwork = if let Some(ref url) = info.artwork_url {
            let colour = Self::artwork_colour(client_data, url).await;
            Some(Artwork {
                url: url.clone().into_boxed_str(),
                colour,
            })
        } else {
            None
        };

        Self {
            paused: data.paused(),
            title: info.title.clone().into(),
            url: info.uri.clone().map(Into::into),
            artist: info.author.clone().into(),
            queue_len: data.queue().total_len(),
            timestamp: Duration::ZERO,
            duration: Duration::from_millis(info.length),
            enqueued: track.enqueued(),
            requester_name: requester_name.into(),
            requester_avatar: requester_avatar.map(Into::into),
            repeat_mode: data.queue().repeat_mode(),
            autoplay: data.autoplay(),
            artwork,
        }
    }
}

#[derive(Clone, Copy)]
pub enum Update {
    Paused(bool),
    Repeat(RepeatMode),
    Autoplay(bool),
    QueueLen(usize),
}

/// The single live, periodically-edited controller message of a guild
/// session.
pub struct Message {
    id: Id<MessageMarker>,
    channel_id: Id<ChannelMarker>,
    data: Data,
    http: Arc<Client>,
}

impl Message {
    pub async fn new(
        http: Arc<Client>,
        data: Data,
        channel_id: Id<ChannelMarker>,
    ) -> Result<Self, NewNowPlayingMessageError> {
        let mut msg = Self {
            id: Id::new(u64::MAX), // placeholder until the send returns
            channel_id,
            data,
            http: http.clone(),
        };
        let response = http
            .create_message(channel_id)
            .content(msg.build_content())
            .embeds(&[msg.build_embed()?])
            .components(&msg.build_components())
            .await?;
        msg.id = response.model().await?.id;

        Ok(msg)
    }

    pub const fn id(&self) -> Id<MessageMarker> {
        self.id
    }

    pub const fn channel_id(&self) -> Id<ChannelMarker> {
        self.channel_id
    }

    pub const fn update(&mut self, update: Update) {
        match update {
            Update::Paused(paused) => self.data.paused = paused,
            Update::Repeat(mode) => self.data.repeat_mode = mode,
            Update::Autoplay(autoplay) => self.data.autoplay = autoplay,
            Update::QueueLen(len) => self.data.queue_len = len,
        }
    }

    pub const fn update_timestamp(&mut self, timestamp: Duration) {
        self.data.timestamp = timestamp;
    }

    pub async fn apply_update(&self) -> Result<(), UpdateNowPlayingMessageError> {
        self.http
            .update_message(self.channel_id, self.id)
            .content(Some(self.build_content()))
            .embeds(Some(&[self.build_embed()?]))
            .components(Some(&self.build_components()))
            .await?;
        Ok(())
    }

    const fn build_content(&self) -> &'static str {
        if self.data.paused {
            return "⏸️ **Paused**";
        }
        "🎵 **Now Playing**"
    }

    fn button(
        button: ControllerButton,
        emoji: &str,
        style: ButtonStyle,
        disabled: bool,
    ) -> Component {
        Component::Button(Button {
            custom_id: Some(button.custom_id().to_owned()),
            disabled,
            emoji: Some(EmojiReactionType::Unicode {
                name: emoji.to_owned(),
            }),
            label: None,
            style,
            url: None,
            sku_id: None,
        })
    }

    fn build_components(&self) -> [Component; 2] {
        let play_pause_emoji = if self.data.paused { "▶️" } else { "⏸️" };
        let autoplay_style = if self.data.autoplay {
            ButtonStyle::Primary
        } else {
            ButtonStyle::Secondary
        };

        let first = Component::ActionRow(ActionRow {
            components: vec![
                Self::button(
                    ControllerButton::PlayPause,
                    play_pause_emoji,
                    ButtonStyle::Secondary,
                    false,
                ),
                Self::button(ControllerButton::Skip, "⏭️", ButtonStyle::Secondary, false),
                Self::button(ControllerButton::Stop, "⏹️", ButtonStyle::Secondary, false),
                Self::button(
                    ControllerButton::Repeat,
                    self.data.repeat_mode.emoji(),
                    ButtonStyle::Secondary,
                    false,
                ),
                Self::button(ControllerButton::Autoplay, "♾️", autoplay_style, false),
            ],
        });
        let second = Component::ActionRow(ActionRow {
            components: vec![
                Self::button(ControllerButton::Lyrics, "📜", ButtonStyle::Secondary, false),
                Self::button(ControllerButton::Queue, "📋", ButtonStyle::Secondary, false),
                Self::button(ControllerButton::Shuffle, "🔀", ButtonStyle::Secondary, false),
                Self::button(ControllerButton::Filter, "🎛️", ButtonStyle::Secondary, false),
                Self::button(ControllerButton::Favorite, "❤️", ButtonStyle::Secondary, false),
            ],
        });
        [first, second]
    }

    fn build_embed(&self) -> Result<twilight_model::channel::message::Embed, BuildNowPlayingError> {
        let data = &self.data;
        let description = format!(
            "#️⃣ **{}** in queue ⏳ `{} / {}`",
            data.queue_len,
            data.timestamp.pretty_display(),
            data.duration.pretty_display(),
        );

        #[allow(clippy::cast_possible_truncation)]
        let timestamp =
            twilight_model::util::Timestamp::from_micros(data.enqueued.as_micros() as i64)?;

        let mut footer = EmbedFooterBuilder::new(data.requester_name.clone());
        if let Some(ref avatar) = data.requester_avatar {
            footer = footer.icon_url(ImageSource::url(avatar.clone())?);
        }

        let mut embed = EmbedBuilder::new()
            .title(data.title.clone())
            .description(description)
            .timestamp(timestamp)
            .author(EmbedAuthorBuilder::new(data.artist.clone()).build())
            .footer(footer.build());

        if let Some(ref url) = data.url {
            embed = embed.url(url.clone());
        }

        embed = if let Some(ref artwork) = data.artwork {
            embed
                .color(artwork.colour)
                .thumbnail(ImageSource::url(artwork.url.clone())?)
        } else {
            embed.color(DEFAULT_ACCENT)
        };

        Ok(embed.build())
    }
}
