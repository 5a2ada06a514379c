use std::borrow::Cow;

use twilight_model::id::{
    marker::{GuildMarker, UserMarker},
    Id,
};

use crate::core::model::CacheAware;

/// Marks confirmations that were triggered from the controller buttons
/// rather than a typed command.
#[must_use]
pub fn controller_fmt(via_controller: bool, message: &str) -> Cow<'_, str> {
    if via_controller {
        return Cow::Owned(format!("{message} *(via controller)*"));
    }
    Cow::Borrowed(message)
}

fn avatar_url(user_id: Id<UserMarker>, hash: twilight_model::util::ImageHash) -> String {
    format!("https://cdn.discordapp.com/avatars/{user_id}/{hash}.png")
}

/// Resolves a requester's display name and avatar from the cache,
/// degrading to a placeholder when the member is no longer cached.
pub fn requester_display(
    cx: &impl CacheAware,
    guild_id: Id<GuildMarker>,
    user_id: Id<UserMarker>,
) -> (String, Option<String>) {
    let cache = cx.cache();
    let nick = cache
        .member(guild_id, user_id)
        .and_then(|member| member.nick().map(ToOwned::to_owned));

    let Some(user) = cache.user(user_id) else {
        return (nick.unwrap_or_else(|| String::from("Someone")), None);
    };

    let name = nick.unwrap_or_else(|| {
        user.global_name
            .as_deref()
            .unwrap_or(user.name.as_str())
            .to_owned()
    });
    let avatar = user.avatar.map(|hash| avatar_url(user_id, hash));
    (name, avatar)
}

#[cfg(test)]
mod test {
    use super::controller_fmt;

    #[test]
    fn controller_origin_is_marked() {
        assert_eq!(controller_fmt(false, "⏭️ Skipped."), "⏭️ Skipped.");
        assert_eq!(
            controller_fmt(true, "⏭️ Skipped."),
            "⏭️ Skipped. *(via controller)*"
        );
    }
}
