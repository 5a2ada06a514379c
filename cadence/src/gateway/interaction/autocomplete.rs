use twilight_model::application::interaction::InteractionData;

use crate::{
    command::AutocompleteCtx,
    component::queue::play_autocomplete,
    error::gateway::{ProcessError, ProcessResult},
};

impl super::Context {
    pub(super) async fn process_as_autocomplete(mut self) -> ProcessResult {
        let Some(InteractionData::ApplicationCommand(data)) = self.inner.data.take() else {
            unreachable!()
        };
        let name: Box<str> = data.name.clone().into();

        let ctx = AutocompleteCtx::new(self.inner, self.bot, self.latency, self.sender);
        let result = match &*name {
            "play" => play_autocomplete(ctx, *data).await,
            // other commands have no autocompletable options
            _ => return Ok(()),
        };

        result.map_err(|source| ProcessError::AutocompleteExecute { name, source })
    }
}
