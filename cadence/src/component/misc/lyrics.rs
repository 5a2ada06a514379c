use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use twilight_interactions::command::{CommandModel, CreateCommand};
use twilight_model::channel::message::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

use crate::{
    command::{model::BotSlashCommand, require, SlashCtx},
    core::konst::misc::LYRICS_MAX_LENGTH,
    error::CommandResult,
};

static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)official|lyric(s)?|video|audio|visuali[sz]er|\bmv\b|\bhd\b|\bhq\b")
        .expect("regex is valid")
});
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)|\[.*?\]").expect("regex is valid"));

/// Derives an (artist, title) search pair from a track's metadata; video
/// titles often carry the artist before a separator and noise words that
/// would sink the lookup.
fn extract_query(title: &str, author: &str) -> (String, String) {
    let (artist, track_title) = ['-', '–', '|']
        .iter()
        .find_map(|sep| title.split_once(*sep))
        .map_or_else(
            || (author.to_owned(), title.to_owned()),
            |(artist, rest)| (artist.trim().to_owned(), rest.trim().to_owned()),
        );

    let clean = |value: &str| {
        let value = BRACKETED.replace_all(value, " ");
        let value = NOISE.replace_all(&value, " ");
        value.split_whitespace().collect::<Vec<_>>().join(" ")
    };
    (clean(&artist), clean(&track_title))
}

pub struct Found {
    pub artist: String,
    pub title: String,
    pub text: String,
    pub source: &'static str,
}

#[derive(Deserialize)]
struct LrclibRecord {
    #[serde(rename = "trackName")]
    track_name: Option<String>,
    #[serde(rename = "artistName")]
    artist_name: Option<String>,
    #[serde(rename = "plainLyrics")]
    plain_lyrics: Option<String>,
    #[serde(rename = "syncedLyrics")]
    synced_lyrics: Option<String>,
}

async fn lrclib_search(artist: &str, title: &str) -> Option<Found> {
    let response = reqwest::Client::new()
        .get("https://lrclib.net/api/search")
        .query(&[("track_name", title), ("artist_name", artist)])
        .send()
        .await
        .ok()?;
    let records: Vec<LrclibRecord> = response.json().await.ok()?;
    let record = records
        .into_iter()
        .find(|record| record.plain_lyrics.is_some() || record.synced_lyrics.is_some())?;
    Some(Found {
        artist: record.artist_name.unwrap_or_else(|| artist.to_owned()),
        title: record.track_name.unwrap_or_else(|| title.to_owned()),
        text: record.plain_lyrics.or(record.synced_lyrics)?,
        source: "lrclib.net",
    })
}

async fn lrclib_get(artist: &str, title: &str) -> Option<Found> {
    let response = reqwest::Client::new()
        .get("https://lrclib.net/api/get")
        .query(&[("track_name", title), ("artist_name", artist)])
        .send()
        .await
        .ok()?;
    let record: LrclibRecord = response.json().await.ok()?;
    Some(Found {
        artist: record.artist_name.unwrap_or_else(|| artist.to_owned()),
        title: record.track_name.unwrap_or_else(|| title.to_owned()),
        text: record.plain_lyrics.or(record.synced_lyrics)?,
        source: "lrclib.net",
    })
}

#[derive(Deserialize)]
struct OvhResponse {
    lyrics: Option<String>,
}

async fn lyrics_ovh(artist: &str, title: &str) -> Option<Found> {
    let url = format!(
        "https://api.lyrics.ovh/v1/{}/{}",
        urlencoding(artist),
        urlencoding(title)
    );
    let response = reqwest::get(&url).await.ok()?;
    let body: OvhResponse = response.json().await.ok()?;
    Some(Found {
        artist: artist.to_owned(),
        title: title.to_owned(),
        text: body.lyrics?,
        source: "lyrics.ovh",
    })
}

fn urlencoding(value: &str) -> String {
    value
        .bytes()
        .flat_map(|byte| {
            if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
                vec![byte as char]
            } else {
                format!("%{byte:02X}").chars().collect()
            }
        })
        .collect()
}

/// Tries the providers in order, each fail-soft; the first hit wins.
async fn lookup(artist: &str, title: &str) -> Option<Found> {
    if let Some(found) = lrclib_search(artist, title).await {
        return Some(found);
    }
    if let Some(found) = lrclib_get(artist, title).await {
        return Some(found);
    }
    if !artist.is_empty() && !title.is_empty() {
        return lyrics_ovh(artist, title).await;
    }
    None
}

/// Looks up and renders lyrics for a track; `None` means every provider
/// came up empty.
pub async fn lyrics_embed_for(track_title: &str, track_author: &str) -> Option<Embed> {
    let (artist, title) = extract_query(track_title, track_author);
    let found = lookup(&artist, &title).await?;

    let mut text = found.text;
    if text.len() > LYRICS_MAX_LENGTH {
        let mut cut = LYRICS_MAX_LENGTH;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push('…');
    }

    Some(
        EmbedBuilder::new()
            .title(format!("📜 {} — {}", found.artist, found.title))
            .description(text)
            .footer(EmbedFooterBuilder::new(format!("Source: {}", found.source)).build())
            .build(),
    )
}

/// Shows lyrics for the current track.
#[derive(CommandModel, CreateCommand)]
#[command(
    name = "lyrics",
    desc = "Shows lyrics for the current track.",
    contexts = "guild"
)]
pub struct Lyrics;

impl BotSlashCommand for Lyrics {
    async fn run(self, ctx: SlashCtx) -> CommandResult {
        let mut ctx = require::guild(ctx)?;
        let player = require::player(&ctx)?;
        let data = player.data();

        let data_r = data.read().await;
        let track = require::current_track(data_r.queue())?;
        let (title, author) = (
            track.data().info.title.clone(),
            track.data().info.author.clone(),
        );
        drop(data_r);

        ctx.defer(false).await?;
        match lyrics_embed_for(&title, &author).await {
            Some(embed) => ctx.followup_embed(embed).await?,
            None => {
                ctx.followup("❌ Could not find lyrics for this song.")
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::extract_query;

    #[rstest]
    #[case(
        "Artist - Song X (Official Video)",
        "Uploader",
        ("Artist", "Song X")
    )]
    #[case(
        "Song X [HD] (Lyrics)",
        "Artist",
        ("Artist", "Song X")
    )]
    #[case(
        "Band | Track Name (Official Audio)",
        "whoever",
        ("Band", "Track Name")
    )]
    #[case("Plain Title", "Author", ("Author", "Plain Title"))]
    fn artist_and_title_extraction(
        #[case] title: &str,
        #[case] author: &str,
        #[case] expected: (&str, &str),
    ) {
        let (artist, track_title) = extract_query(title, author);
        assert_eq!((artist.as_str(), track_title.as_str()), expected);
    }
}
