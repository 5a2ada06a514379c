pub mod connection;
pub mod favorite;
pub mod misc;
pub mod noprefix;
pub mod playback;
pub mod playlist;
pub mod queue;
pub mod tuning;

use crate::command::{
    model::{GuildCtx, RespondKind},
    util::controller_fmt,
};

/// Answers a control action: controller presses get an ephemeral
/// confirmation, typed commands a normal one.
pub(crate) async fn respond_action<T: RespondKind>(
    ctx: &mut GuildCtx<T>,
    via_controller: bool,
    message: &str,
) -> Result<(), twilight_http::Error> {
    if via_controller {
        let content = controller_fmt(true, message);
        return ctx.hid(content.into_owned()).await;
    }
    ctx.out(message).await
}
