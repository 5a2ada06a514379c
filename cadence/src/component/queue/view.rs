use std::time::Duration;

use cadence_ext::pretty::{duration_display::DurationDisplay, truncate::PrettyTruncator};
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::EmbedBuilder;

use crate::{
    command::{model::BotSlashCommand, require, SlashCtx},
    core::konst::misc::QUEUE_PAGE_SIZE,
    lavalink::PlayerDataRead,
    error::CommandResult,
};

/// Shows the current queue.
#[derive(CommandModel, CreateCommand)]
#[command(name = "queue", desc = "Shows the current queue.", contexts = "guild")]
pub struct Queue;

impl BotSlashCommand for Queue {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        let data_r = data.read().await;
        require::queue_not_empty(&data_r)?;
        let embed = view_queue(&data_r);
        drop(data_r);

        ctx.out_embed(embed).await?;
        Ok(())
    }
}

fn track_line(title: &str, uri: Option<&str>, length: u64) -> String {
    let title = title.pretty_truncate(45);
    let duration = Duration::from_millis(length).pretty_display();
    match uri {
        Some(uri) => format!("[{title}]({uri}) `[{duration}]`"),
        None => format!("{title} `[{duration}]`"),
    }
}

pub fn view_queue(data: &PlayerDataRead<'_>) -> Embed {
    let queue = data.queue();
    let mut description = String::new();

    if let Some(current) = queue.current() {
        let info = &current.data().info;
        description.push_str(&format!(
            "**Now playing** {}\n\n",
            track_line(&info.title, info.uri.as_deref(), info.length)
        ));
    }

    let upcoming_len = queue.len();
    for (index, item) in queue.upcoming().take(QUEUE_PAGE_SIZE).enumerate() {
        let info = &item.data().info;
        description.push_str(&format!(
            "`{}.` {}\n",
            index + 1,
            track_line(&info.title, info.uri.as_deref(), info.length)
        ));
    }
    if upcoming_len > QUEUE_PAGE_SIZE {
        description.push_str(&format!("… and {} more", upcoming_len - QUEUE_PAGE_SIZE));
    }
    if upcoming_len == 0 {
        description.push_str("*Nothing else queued.*");
    }

    EmbedBuilder::new()
        .title(format!("📋 Queue — {} upcoming", upcoming_len))
        .description(description)
        .build()
}
