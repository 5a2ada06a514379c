use twilight_gateway::MessageSender;
use twilight_model::id::{marker::GuildMarker, Id};

use crate::error::gateway::ProcessResult;

pub trait Process {
    async fn process(self) -> ProcessResult;
}

pub trait SenderAware {
    fn sender(&self) -> &MessageSender;
}

pub trait OptionallyGuildIdAware {
    fn get_guild_id(&self) -> Option<Id<GuildMarker>>;
}

pub trait GuildIdAware {
    fn guild_id(&self) -> Id<GuildMarker>;
}
