use twilight_model::guild::Permissions;

use crate::{
    command::model::{CtxKind, GuildCtx},
    core::model::{BotStateAware, CacheAware, ConfigAware},
    error::UserError,
    gateway::GuildIdAware,
};

/// The invoker must share the bot's voice channel to control playback.
pub fn user_in_bot_voice<T: CtxKind>(ctx: &GuildCtx<T>) -> Result<(), UserError> {
    let guild_id = ctx.guild_id();
    let bot_channel = ctx
        .cache()
        .voice_state(ctx.bot().user_id(), guild_id)
        .map(|state| state.channel_id())
        .ok_or(UserError::NoPlayer)?;

    let user_channel = ctx
        .cache()
        .voice_state(ctx.author_id(), guild_id)
        .map(|state| state.channel_id());

    if user_channel != Some(bot_channel) {
        return Err(UserError::NotInBotVoice(bot_channel));
    }
    Ok(())
}

/// Gate for moderation-grade commands: the configured owner, or a member
/// with Administrator / Manage Guild.
pub fn admin<T: CtxKind>(ctx: &GuildCtx<T>) -> Result<(), UserError> {
    if ctx.config().owner_id == Some(ctx.author_id()) {
        return Ok(());
    }
    let permissions = ctx.author_permissions();
    if permissions.contains(Permissions::ADMINISTRATOR)
        || permissions.contains(Permissions::MANAGE_GUILD)
    {
        return Ok(());
    }
    Err(UserError::NotAllowed)
}
