use std::{
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

use sqlx::{Pool, Sqlite};
use twilight_cache_inmemory::InMemoryCache;
use twilight_gateway::{Latency, MessageSender};
use twilight_http::Client;
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_model::{
    application::interaction::InteractionData,
    channel::{
        message::{Embed, MessageFlags},
        Message,
    },
    gateway::payload::incoming::InteractionCreate,
    guild::{PartialMember, Permissions},
    http::interaction::{InteractionResponse, InteractionResponseType},
    id::{
        marker::{ChannelMarker, GuildMarker, UserMarker},
        Id,
    },
    user::User,
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::{
    core::model::{
        BotState, BotStateAware, CacheAware, Config, ConfigAware, DatabaseAware, HttpAware,
        OwnedBotState, OwnedBotStateAware,
    },
    error::{CommandResult, UserError},
    gateway::{GuildIdAware, OptionallyGuildIdAware, SenderAware},
    lavalink::Lavalink,
    LavalinkAware,
};

pub trait CtxKind: Send + Sync {}

pub struct SlashMarker;
impl CtxKind for SlashMarker {}

pub struct ComponentMarker;
impl CtxKind for ComponentMarker {}

pub struct AutocompleteMarker;
impl CtxKind for AutocompleteMarker {}

/// Kinds that answer with messages (slash commands and components, but
/// not autocomplete).
pub trait RespondKind: CtxKind {}
impl RespondKind for SlashMarker {}
impl RespondKind for ComponentMarker {}

pub type SlashCtx = Ctx<SlashMarker>;
pub type ComponentCtx = Ctx<ComponentMarker>;
pub type AutocompleteCtx = Ctx<AutocompleteMarker>;

/// An in-flight interaction plus everything a handler needs to answer it.
pub struct Ctx<T: CtxKind> {
    inner: Box<InteractionCreate>,
    bot: OwnedBotState,
    latency: Latency,
    sender: MessageSender,
    acknowledged: bool,
    deferred: bool,
    kind: PhantomData<fn(T) -> T>,
}

impl<T: CtxKind> Ctx<T> {
    pub fn new(
        inner: Box<InteractionCreate>,
        bot: OwnedBotState,
        latency: Latency,
        sender: MessageSender,
    ) -> Self {
        Self {
            inner,
            bot,
            latency,
            sender,
            acknowledged: false,
            deferred: false,
            kind: PhantomData,
        }
    }

    pub fn author(&self) -> &User {
        self.inner
            .author()
            .expect("non-ping interactions have an author")
    }

    pub fn author_id(&self) -> Id<UserMarker> {
        self.author().id
    }

    pub fn channel_id(&self) -> Id<ChannelMarker> {
        self.inner
            .channel
            .as_ref()
            .expect("non-ping interactions have a channel")
            .id
    }

    pub const fn latency(&self) -> &Latency {
        &self.latency
    }
}

impl<T: RespondKind> Ctx<T> {
    async fn respond_with(
        &mut self,
        content: Option<String>,
        embeds: Vec<Embed>,
        ephemeral: bool,
    ) -> Result<(), twilight_http::Error> {
        let mut data = InteractionResponseDataBuilder::new().embeds(embeds);
        if let Some(content) = content {
            data = data.content(content);
        }
        if ephemeral {
            data = data.flags(MessageFlags::EPHEMERAL);
        }
        let response = InteractionResponse {
            kind: InteractionResponseType::ChannelMessageWithSource,
            data: Some(data.build()),
        };
        self.bot
            .interaction()
            .create_response(self.inner.id, &self.inner.token, &response)
            .await?;
        self.acknowledged = true;
        Ok(())
    }

    /// Replies normally.
    pub async fn out(&mut self, content: impl Into<String>) -> Result<(), twilight_http::Error> {
        self.respond_with(Some(content.into()), Vec::new(), false).await
    }

    /// Replies ephemerally.
    pub async fn hid(&mut self, content: impl Into<String>) -> Result<(), twilight_http::Error> {
        self.respond_with(Some(content.into()), Vec::new(), true).await
    }

    pub async fn out_embed(&mut self, embed: Embed) -> Result<(), twilight_http::Error> {
        self.respond_with(None, vec![embed], false).await
    }

    pub async fn hid_embed(&mut self, embed: Embed) -> Result<(), twilight_http::Error> {
        self.respond_with(None, vec![embed], true).await
    }

    pub async fn defer(&mut self, ephemeral: bool) -> Result<(), twilight_http::Error> {
        let data = ephemeral.then(|| {
            InteractionResponseDataBuilder::new()
                .flags(MessageFlags::EPHEMERAL)
                .build()
        });
        let response = InteractionResponse {
            kind: InteractionResponseType::DeferredChannelMessageWithSource,
            data,
        };
        self.bot
            .interaction()
            .create_response(self.inner.id, &self.inner.token, &response)
            .await?;
        self.acknowledged = true;
        self.deferred = true;
        Ok(())
    }

    /// After a defer, fills in the deferred response; otherwise posts a
    /// followup message.
    pub async fn followup(&self, content: &str) -> Result<(), twilight_http::Error> {
        if self.deferred {
            self.bot
                .interaction()
                .update_response(&self.inner.token)
                .content(Some(content))
                .await?;
            return Ok(());
        }
        self.bot
            .interaction()
            .create_followup(&self.inner.token)
            .content(content)
            .await?;
        Ok(())
    }

    pub async fn followup_embed(&self, embed: Embed) -> Result<(), twilight_http::Error> {
        if self.deferred {
            self.bot
                .interaction()
                .update_response(&self.inner.token)
                .embeds(Some(&[embed]))
                .await?;
            return Ok(());
        }
        self.bot
            .interaction()
            .create_followup(&self.inner.token)
            .embeds(&[embed])
            .await?;
        Ok(())
    }

    /// Whichever of reply or followup the interaction is still open to;
    /// deferred interactions can only follow up.
    pub async fn out_or_followup(&mut self, content: &str) -> Result<(), twilight_http::Error> {
        if self.acknowledged {
            return self.followup(content).await;
        }
        self.out(content).await
    }

}

impl Ctx<ComponentMarker> {
    pub fn message(&self) -> &Message {
        self.inner
            .message
            .as_ref()
            .expect("component interactions have a message")
    }

    pub fn custom_id(&self) -> Option<&str> {
        match self.inner.data {
            Some(InteractionData::MessageComponent(ref data)) => Some(&data.custom_id),
            _ => None,
        }
    }
}

impl Ctx<AutocompleteMarker> {
    pub async fn respond_choices(
        &self,
        choices: Vec<twilight_model::application::command::CommandOptionChoice>,
    ) -> Result<(), twilight_http::Error> {
        let response = InteractionResponse {
            kind: InteractionResponseType::ApplicationCommandAutocompleteResult,
            data: Some(InteractionResponseDataBuilder::new().choices(choices).build()),
        };
        self.bot
            .interaction()
            .create_response(self.inner.id, &self.inner.token, &response)
            .await?;
        Ok(())
    }
}

impl<T: CtxKind> BotStateAware for Ctx<T> {
    fn bot(&self) -> &BotState {
        &self.bot
    }
}

impl<T: CtxKind> OwnedBotStateAware for Ctx<T> {
    fn bot_owned(&self) -> OwnedBotState {
        self.bot.clone()
    }
}

impl<T: CtxKind> CacheAware for Ctx<T> {
    fn cache(&self) -> &InMemoryCache {
        self.bot.cache()
    }
}

impl<T: CtxKind> HttpAware for Ctx<T> {
    fn http(&self) -> &Client {
        self.bot.http()
    }
}

impl<T: CtxKind> DatabaseAware for Ctx<T> {
    fn db(&self) -> &Pool<Sqlite> {
        self.bot.db()
    }
}

impl<T: CtxKind> ConfigAware for Ctx<T> {
    fn config(&self) -> &Config {
        self.bot.config()
    }
}

impl<T: CtxKind> LavalinkAware for Ctx<T> {
    fn lavalink(&self) -> &Lavalink {
        self.bot.lavalink()
    }
}

impl<T: CtxKind> SenderAware for Ctx<T> {
    fn sender(&self) -> &MessageSender {
        &self.sender
    }
}

impl<T: CtxKind> OptionallyGuildIdAware for Ctx<T> {
    fn get_guild_id(&self) -> Option<Id<GuildMarker>> {
        self.inner.guild_id
    }
}

/// A [`Ctx`] proven to be from a guild.
pub struct GuildCtx<T: CtxKind> {
    inner: Ctx<T>,
    guild_id: Id<GuildMarker>,
}

impl<T: CtxKind> TryFrom<Ctx<T>> for GuildCtx<T> {
    type Error = (UserError, Ctx<T>);

    fn try_from(ctx: Ctx<T>) -> Result<Self, Self::Error> {
        let Some(guild_id) = ctx.get_guild_id() else {
            return Err((UserError::NotInGuild, ctx));
        };
        Ok(Self {
            inner: ctx,
            guild_id,
        })
    }
}

impl<T: CtxKind> GuildCtx<T> {
    pub fn member(&self) -> &PartialMember {
        self.inner
            .inner
            .member
            .as_ref()
            .expect("guild interactions have a member")
    }

    pub fn author_permissions(&self) -> Permissions {
        self.member().permissions.unwrap_or(Permissions::empty())
    }
}

impl<T: CtxKind> Deref for GuildCtx<T> {
    type Target = Ctx<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: CtxKind> DerefMut for GuildCtx<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T: CtxKind> GuildIdAware for GuildCtx<T> {
    fn guild_id(&self) -> Id<GuildMarker> {
        self.guild_id
    }
}

impl<T: CtxKind> LavalinkAware for GuildCtx<T> {
    fn lavalink(&self) -> &Lavalink {
        self.inner.bot.lavalink()
    }
}

pub trait BotSlashCommand: CommandModel + CreateCommand {
    async fn run(self, ctx: SlashCtx) -> CommandResult;
}
