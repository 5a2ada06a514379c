use std::{collections::HashSet, sync::LazyLock};

use lavalink_rs::{
    client::LavalinkClient,
    model::track::{Track, TrackData, TrackLoadData, TrackLoadType},
};
use regex::Regex;

use crate::{
    core::{konst::misc::AUTOPLAY_MAX_TRACKS, model::HttpAware},
    error::lavalink::ProcessResult,
    lavalink::{LastPlayed, QueueItem, UnwrappedData},
};

type LavalinkGuildId = lavalink_rs::model::GuildId;

static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)|\[.*?\]").expect("regex is valid"));

/// Normalises a track title for duplicate detection: bracketed segments
/// and punctuation go, case and whitespace are folded.
fn normalise_title(title: &str) -> String {
    let stripped = BRACKETED.replace_all(title, " ");
    stripped
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// The candidate filter: heuristic, best-effort de-duplication against the
/// session's recently-played identifiers and this round's own picks.
fn pick(
    candidates: Vec<TrackData>,
    seed_title: &str,
    history: &HashSet<Box<str>>,
    cap: usize,
) -> Vec<TrackData> {
    let mut seen = HashSet::from([normalise_title(seed_title)]);
    let mut picked = Vec::new();

    for track in candidates {
        if picked.len() >= cap {
            break;
        }
        if track.info.author.is_empty() {
            continue;
        }
        if history.contains(track.info.identifier.as_str()) {
            continue;
        }
        let title = normalise_title(&track.info.title);
        if title.is_empty() || seen.contains(&title) {
            continue;
        }
        seen.insert(title);
        picked.push(track);
    }

    picked
}

fn tracks_from(loaded: Track) -> Vec<TrackData> {
    match (loaded.load_type, loaded.data) {
        (TrackLoadType::Track, Some(TrackLoadData::Track(track))) => vec![track],
        (TrackLoadType::Playlist, Some(TrackLoadData::Playlist(playlist))) => playlist.tracks,
        (TrackLoadType::Search, Some(TrackLoadData::Search(tracks))) => tracks,
        _ => Vec::new(),
    }
}

async fn notify(lavalink: &LavalinkClient, guild_id: LavalinkGuildId, content: &str) {
    let client_data = lavalink.data_unwrapped();
    let Some(data) = lavalink
        .get_player_context(guild_id)
        .map(|player| player.data_unwrapped())
    else {
        return;
    };
    let channel_id = data.read().await.text_channel_id();
    let _ = client_data
        .http()
        .create_message(channel_id)
        .content(content)
        .await;
}

/// Locates related tracks when the queue empties and keeps the session
/// going with them.
#[tracing::instrument(skip_all, name = "autoplay", fields(guild_id = guild_id.0))]
pub(super) async fn continue_from(
    lavalink: &LavalinkClient,
    guild_id: LavalinkGuildId,
    seed: LastPlayed,
) -> ProcessResult {
    let Some(player) = lavalink.get_player_context(guild_id) else {
        return Ok(());
    };
    let data = player.data_unwrapped();
    let info = &seed.info;

    // a YouTube seed gets the radio/mix strategy first; resolve failures
    // here are a normal empty outcome, not an error
    let mut tracks = Vec::new();
    if info
        .uri
        .as_deref()
        .is_some_and(|uri| uri.contains("youtube.com") || uri.contains("youtu.be"))
    {
        let radio = format!(
            "https://music.youtube.com/watch?v={id}&list=RD{id}",
            id = info.identifier
        );
        if let Ok(loaded) = lavalink.load_tracks(guild_id, &*radio).await {
            tracks = tracks_from(loaded);
        }
    }

    if tracks.is_empty() {
        let query = format!("ytsearch:{} {}", info.title, info.author);
        if let Ok(loaded) = lavalink.load_tracks(guild_id, &*query).await {
            tracks = tracks_from(loaded);
        }
    }

    if tracks.is_empty() {
        notify(
            lavalink,
            guild_id,
            "♾️ Autoplay couldn't find related tracks. Use `/play` to add more songs!",
        )
        .await;
        return Ok(());
    }

    let data_r = data.read().await;
    let picked = pick(
        tracks,
        &info.title,
        data_r.autoplay_history(),
        AUTOPLAY_MAX_TRACKS,
    );
    drop(data_r);

    if picked.is_empty() {
        notify(
            lavalink,
            guild_id,
            "♾️ Autoplay found only duplicates. Use `/play` to add more songs!",
        )
        .await;
        return Ok(());
    }

    let count = picked.len();
    let mut data_w = data.write().await;
    for track in picked {
        data_w.queue_mut().enqueue(QueueItem::new(track, seed.requester));
    }
    let next = if data_w.queue().current().is_none() {
        data_w.queue_mut().advance(false).map(|item| item.data().clone())
    } else {
        None
    };
    drop(data_w);

    if let Some(track) = next {
        player.play_now(&track).await?;
    }

    let plural = if count == 1 { "" } else { "s" };
    notify(
        lavalink,
        guild_id,
        &format!(
            "♾️ **Autoplay** added {count} similar track{plural} to the queue, based on **{}**.",
            info.title
        ),
    )
    .await;

    Ok(())
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use lavalink_rs::model::track::{TrackData, TrackInfo};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{normalise_title, pick};

    fn track(title: &str, identifier: &str, author: &str) -> TrackData {
        TrackData {
            encoded: String::new(),
            info: TrackInfo {
                identifier: identifier.to_owned(),
                is_seekable: true,
                author: author.to_owned(),
                length: 60_000,
                is_stream: false,
                position: 0,
                title: title.to_owned(),
                uri: None,
                artwork_url: None,
                isrc: None,
                source_name: "youtube".to_owned(),
            },
            plugin_info: None,
            user_data: None,
        }
    }

    #[rstest]
    #[case("Song X (Official Video)", "song x")]
    #[case("Song X [HD] (Lyrics)", "song x")]
    #[case("SONG-X!!!", "song x")]
    #[case("  spaced   out  ", "spaced out")]
    #[case("(all bracketed)", "")]
    fn titles_normalise_for_comparison(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalise_title(input), expected);
    }

    #[test]
    fn recently_played_identifiers_are_rejected() {
        let history = HashSet::from([Box::from("seen")]);
        let picked = pick(
            vec![track("Fresh", "new", "A"), track("Stale", "seen", "B")],
            "Seed Song",
            &history,
            6,
        );
        let titles = picked.iter().map(|t| t.info.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["Fresh"]);
    }

    #[test]
    fn batch_duplicates_and_the_seed_title_are_rejected() {
        let picked = pick(
            vec![
                track("Seed Song (Official Video)", "1", "A"),
                track("Other Song", "2", "A"),
                track("Other Song (Remastered)", "3", "B"),
            ],
            "Seed Song",
            &HashSet::new(),
            6,
        );
        let titles = picked.iter().map(|t| t.info.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["Other Song"]);
    }

    #[test]
    fn authorless_tracks_are_skipped() {
        let picked = pick(
            vec![track("No Author", "1", ""), track("Has Author", "2", "A")],
            "Seed",
            &HashSet::new(),
            6,
        );
        let titles = picked.iter().map(|t| t.info.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["Has Author"]);
    }

    #[test]
    fn one_round_is_capped() {
        let candidates = (0..20)
            .map(|i| track(&format!("Track {i}"), &format!("id{i}"), "A"))
            .collect();
        let picked = pick(candidates, "Seed", &HashSet::new(), 6);
        assert_eq!(picked.len(), 6);
    }
}
