use std::time::Duration;

use itertools::Itertools;
use twilight_interactions::command::{CommandModel, CreateCommand, ResolvedUser};
use twilight_mention::Mention;
use twilight_util::builder::embed::EmbedBuilder;

use crate::{
    command::{check, model::BotSlashCommand, require, SlashCtx},
    core::model::{BotStateAware, DatabaseAware},
    db,
    error::{CommandResult, UserError},
};

/// Parses a grant duration label: `30m`, `12h`, `7d`, `30d` or `perm`.
/// The outer `None` is a parse failure; `Some(None)` is a permanent grant.
fn parse_duration_label(label: &str) -> Option<Option<Duration>> {
    let label = label.trim().to_ascii_lowercase();
    if matches!(label.as_str(), "perm" | "permanent" | "forever") {
        return Some(None);
    }
    if !label.is_ascii() {
        return None;
    }

    let (digits, unit) = label.split_at(label.len().checked_sub(1)?);
    let amount: u64 = digits.parse().ok()?;
    if amount == 0 {
        return None;
    }
    let seconds = match unit {
        "m" => amount.checked_mul(60)?,
        "h" => amount.checked_mul(60 * 60)?,
        "d" => amount.checked_mul(60 * 60 * 24)?,
        _ => return None,
    };
    Some(Some(Duration::from_secs(seconds)))
}

/// Manage prefix-free message command grants.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "noprefix",
    desc = "Manage prefix-free message command grants.",
    contexts = "guild"
)]
pub enum NoPrefix {
    #[command(name = "grant")]
    Grant(Grant),
    #[command(name = "revoke")]
    Revoke(Revoke),
    #[command(name = "list")]
    List(List),
}

impl BotSlashCommand for NoPrefix {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        match self {
            Self::Grant(cmd) => cmd.run(ctx).await,
            Self::Revoke(cmd) => cmd.run(ctx).await,
            Self::List(cmd) => cmd.run(ctx).await,
        }
    }
}

/// Lets a user run message commands without the prefix.
#[derive(CommandModel, CreateCommand)]
#[command(name = "grant", desc = "Lets a user run message commands without the prefix.")]
pub struct Grant {
    /// Who to grant it to.
    user: ResolvedUser,
    /// How long the grant lasts: 30m, 12h, 7d, 30d or perm.
    duration: String,
}

impl BotSlashCommand for Grant {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::admin(&ctx)?;

        let duration = parse_duration_label(&self.duration)
            .ok_or_else(|| UserError::InvalidTimestamp(self.duration.clone().into()))?;
        let expires_at = duration.map(|duration| {
            i64::try_from((cadence_ext::unix_time() + duration).as_secs()).unwrap_or(i64::MAX)
        });

        let target = &self.user.resolved;
        db::no_prefix::grant(
            ctx.bot().db(),
            &target.id.to_string(),
            &target.name,
            &ctx.author_id().to_string(),
            &ctx.author().name.clone(),
            expires_at,
            &self.duration,
        )
        .await?;

        ctx.out(format!(
            "🔓 {} can now use message commands without the prefix (`{}`).",
            target.id.mention(),
            self.duration
        ))
        .await?;
        Ok(())
    }
}

/// Revokes a user's prefix-free grant.
#[derive(CommandModel, CreateCommand)]
#[command(name = "revoke", desc = "Revokes a user's prefix-free grant.")]
pub struct Revoke {
    /// Whose grant to revoke.
    user: ResolvedUser,
}

impl BotSlashCommand for Revoke {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::admin(&ctx)?;

        let target = &self.user.resolved;
        let revoked = db::no_prefix::revoke(ctx.bot().db(), &target.id.to_string()).await?;
        if !revoked {
            return Err(UserError::GrantNotFound.into());
        }

        ctx.out(format!("🔒 Revoked {}'s grant.", target.id.mention()))
            .await?;
        Ok(())
    }
}

/// Lists active prefix-free grants.
#[derive(CommandModel, CreateCommand)]
#[command(name = "list", desc = "Lists active prefix-free grants.")]
pub struct List;

impl BotSlashCommand for List {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        check::admin(&ctx)?;

        let grants = db::no_prefix::all(ctx.bot().db()).await?;
        if grants.is_empty() {
            ctx.hid("🔒 No active grants.").await?;
            return Ok(());
        }

        let description = grants
            .iter()
            .map(|grant| {
                let expiry = match grant.expires_at {
                    Some(at) => format!("expires <t:{at}:R>"),
                    None => String::from("permanent"),
                };
                format!(
                    "**{}** — granted by {} ({expiry})",
                    grant.username, grant.granted_by_username,
                )
            })
            .join("\n");

        let embed = EmbedBuilder::new()
            .title(format!("🔓 No-prefix grants — {}", grants.len()))
            .description(description)
            .build();
        ctx.out_embed(embed).await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::parse_duration_label;

    #[rstest]
    #[case("30m", Some(Some(Duration::from_secs(30 * 60))))]
    #[case("12h", Some(Some(Duration::from_secs(12 * 3600))))]
    #[case("7d", Some(Some(Duration::from_secs(7 * 86_400))))]
    #[case("perm", Some(None))]
    #[case("FOREVER", Some(None))]
    #[case("0d", None)]
    #[case("5w", None)]
    #[case("", None)]
    #[case("h", None)]
    fn duration_labels(#[case] input: &str, #[case] expected: Option<Option<Duration>>) {
        assert_eq!(parse_duration_label(input), expected);
    }
}
