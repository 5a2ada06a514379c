use twilight_model::{
    application::interaction::InteractionData,
    channel::message::MessageFlags,
    http::interaction::{InteractionResponse, InteractionResponseType},
    id::{marker::InteractionMarker, Id},
};
use twilight_util::builder::InteractionResponseDataBuilder;

use crate::{
    command::SlashCtx,
    error::{
        command::{Error, ExecuteError},
        gateway::{ProcessError, ProcessResult},
    },
    lavalink::UnwrappedData,
    LavalinkAware,
};

impl super::Context {
    pub(super) async fn process_as_app_command(mut self) -> ProcessResult {
        let Some(InteractionData::ApplicationCommand(data)) = self.inner.data.take() else {
            unreachable!()
        };
        let name: Box<str> = data.name.clone().into();
        let interaction_id = self.inner.id;
        let token = self.inner.token.clone();
        let guild_id = self.inner.guild_id;
        let channel_id = self.inner.channel.as_ref().map(|channel| channel.id);
        let bot = self.bot.clone();

        let ctx = SlashCtx::new(self.inner, self.bot, self.latency, self.sender);
        let result = ctx.execute(*data).await;

        // whatever happened, future session notifications follow the user
        // to the channel the command came from
        if let (Some(guild_id), Some(channel_id)) = (guild_id, channel_id) {
            if let Some(player) = bot.lavalink().get_player_context(guild_id) {
                player
                    .data_unwrapped()
                    .write()
                    .await
                    .set_text_channel_id(channel_id);
            }
        }

        let Err(error) = result else {
            return Ok(());
        };

        match error {
            ExecuteError::Command(Error::User(ref user_error)) => {
                reply_error(&bot, interaction_id, &token, &user_error.user_message()).await;
                Ok(())
            }
            ExecuteError::Command(source) => {
                reply_error(
                    &bot,
                    interaction_id,
                    &token,
                    "⚠️ Something went wrong executing this command.",
                )
                .await;
                Err(ProcessError::CommandExecute { name, source })
            }
            ExecuteError::UnknownCommand(_) | ExecuteError::Parse(_) => {
                tracing::error!(%name, %error, "command dispatch failed");
                reply_error(
                    &bot,
                    interaction_id,
                    &token,
                    "⚠️ Something went wrong executing this command.",
                )
                .await;
                Ok(())
            }
        }
    }
}

/// Best-effort error reply: a fresh response if the interaction is still
/// unacknowledged, otherwise an ephemeral followup.
async fn reply_error(
    bot: &crate::core::model::BotState,
    interaction_id: Id<InteractionMarker>,
    token: &str,
    content: &str,
) {
    let response = InteractionResponse {
        kind: InteractionResponseType::ChannelMessageWithSource,
        data: Some(
            InteractionResponseDataBuilder::new()
                .content(content)
                .flags(MessageFlags::EPHEMERAL)
                .build(),
        ),
    };
    if bot
        .interaction()
        .create_response(interaction_id, token, &response)
        .await
        .is_err()
    {
        // already acknowledged, so fill in the deferred response instead
        let _ = bot
            .interaction()
            .update_response(token)
            .content(Some(content))
            .await;
    }
}
