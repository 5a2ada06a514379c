mod app_command;
mod autocomplete;
mod component;

use twilight_gateway::{Latency, MessageSender};
use twilight_model::{
    application::interaction::InteractionType, gateway::payload::incoming::InteractionCreate,
};

use crate::{core::model::OwnedBotState, error::gateway::ProcessResult};

use super::model::Process;

pub(super) struct Context {
    inner: Box<InteractionCreate>,
    bot: OwnedBotState,
    latency: Latency,
    sender: MessageSender,
}

impl Context {
    pub(super) const fn new(
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
        }
    }
}

impl Process for Context {
    async fn process(self) -> ProcessResult {
        match self.inner.kind {
            InteractionType::ApplicationCommand => self.process_as_app_command().await,
            InteractionType::ApplicationCommandAutocomplete => self.process_as_autocomplete().await,
            InteractionType::MessageComponent => self.process_as_component().await,
            // pings are answered by the HTTP layer; modals are unused
            _ => Ok(()),
        }
    }
}
