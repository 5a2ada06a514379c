use rand::{distr::Alphanumeric, Rng};
use sqlx::{FromRow, Pool, Sqlite};

use crate::core::konst::misc::SHARE_CODE_LENGTH;

#[derive(FromRow, Debug, Clone)]
pub struct Playlist {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub share_code: Option<String>,
}

#[derive(FromRow, Debug, Clone)]
pub struct PlaylistTrack {
    pub id: i64,
    pub playlist_id: i64,
    pub title: String,
    pub identifier: String,
    pub author: String,
    pub length: i64,
    pub uri: String,
    pub artwork_url: Option<String>,
}

/// A track pending insertion, decoupled from where it came from (live
/// queue, search result or another playlist).
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub title: String,
    pub identifier: String,
    pub author: String,
    pub length: i64,
    pub uri: String,
    pub artwork_url: Option<String>,
}

const SELECT_PLAYLIST: &str = "SELECT id, user_id, name, share_code FROM playlists";
const SELECT_TRACK: &str =
    "SELECT id, playlist_id, title, identifier, author, length, uri, artwork_url
    FROM playlist_tracks";

pub async fn find_by_name(
    db: &Pool<Sqlite>,
    user_id: &str,
    name: &str,
) -> sqlx::Result<Option<Playlist>> {
    sqlx::query_as(&format!("{SELECT_PLAYLIST} WHERE user_id = ? AND name = ?;"))
        .bind(user_id)
        .bind(name)
        .fetch_optional(db)
        .await
}

pub async fn find_by_share_code(
    db: &Pool<Sqlite>,
    share_code: &str,
) -> sqlx::Result<Option<Playlist>> {
    sqlx::query_as(&format!("{SELECT_PLAYLIST} WHERE share_code = ?;"))
        .bind(share_code)
        .fetch_optional(db)
        .await
}

pub async fn all_for_user(db: &Pool<Sqlite>, user_id: &str) -> sqlx::Result<Vec<Playlist>> {
    sqlx::query_as(&format!("{SELECT_PLAYLIST} WHERE user_id = ? ORDER BY id;"))
        .bind(user_id)
        .fetch_all(db)
        .await
}

pub async fn create(db: &Pool<Sqlite>, user_id: &str, name: &str) -> sqlx::Result<Playlist> {
    sqlx::query_as(
        "INSERT INTO playlists (user_id, name) VALUES (?, ?)
        RETURNING id, user_id, name, share_code;",
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(db)
    .await
}

pub async fn rename(db: &Pool<Sqlite>, playlist_id: i64, name: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE playlists SET name = ? WHERE id = ?;")
        .bind(name)
        .bind(playlist_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Cascades to the playlist's tracks.
pub async fn delete(db: &Pool<Sqlite>, playlist_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM playlists WHERE id = ?;")
        .bind(playlist_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Tracks in insertion order; user-facing positions are derived from this
/// order at read time, so removing a middle track shifts the positions of
/// everything after it on the next listing.
pub async fn tracks(db: &Pool<Sqlite>, playlist_id: i64) -> sqlx::Result<Vec<PlaylistTrack>> {
    sqlx::query_as(&format!("{SELECT_TRACK} WHERE playlist_id = ? ORDER BY id;"))
        .bind(playlist_id)
        .fetch_all(db)
        .await
}

pub async fn track_count(db: &Pool<Sqlite>, playlist_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM playlist_tracks WHERE playlist_id = ?;")
        .bind(playlist_id)
        .fetch_one(db)
        .await
}

pub async fn add_tracks(
    db: &Pool<Sqlite>,
    playlist_id: i64,
    tracks: &[NewTrack],
) -> sqlx::Result<()> {
    let mut tx = db.begin().await?;
    for track in tracks {
        sqlx::query(
            "INSERT INTO playlist_tracks
                (playlist_id, title, identifier, author, length, uri, artwork_url)
            VALUES (?, ?, ?, ?, ?, ?, ?);",
        )
        .bind(playlist_id)
        .bind(&track.title)
        .bind(&track.identifier)
        .bind(&track.author)
        .bind(track.length)
        .bind(&track.uri)
        .bind(&track.artwork_url)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

pub async fn remove_track(db: &Pool<Sqlite>, track_id: i64) -> sqlx::Result<()> {
    sqlx::query("DELETE FROM playlist_tracks WHERE id = ?;")
        .bind(track_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Returns the playlist's share code, lazily generating a globally unique
/// one on first request.
pub async fn ensure_share_code(db: &Pool<Sqlite>, playlist: &Playlist) -> sqlx::Result<String> {
    if let Some(ref code) = playlist.share_code {
        return Ok(code.clone());
    }

    loop {
        let code: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SHARE_CODE_LENGTH)
            .map(char::from)
            .collect();

        if find_by_share_code(db, &code).await?.is_some() {
            continue;
        }

        sqlx::query("UPDATE playlists SET share_code = ? WHERE id = ?;")
            .bind(&code)
            .bind(playlist.id)
            .execute(db)
            .await?;
        return Ok(code);
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::NewTrack;
    use crate::db;

    fn track(title: &str) -> NewTrack {
        NewTrack {
            title: title.to_owned(),
            identifier: format!("id-{title}"),
            author: "Artist".to_owned(),
            length: 60_000,
            uri: format!("https://y/{title}"),
            artwork_url: None,
        }
    }

    #[tokio::test]
    async fn saved_tracks_keep_their_relative_order() {
        let pool = db::test::pool().await;
        let playlist = super::create(&pool, "1", "mix").await.expect("create");

        let tracks = ["a", "b", "c", "d"].map(|t| track(t));
        super::add_tracks(&pool, playlist.id, &tracks)
            .await
            .expect("add");

        let listed = super::tracks(&pool, playlist.id).await.expect("list");
        let titles = listed.iter().map(|t| t.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, ["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn removing_the_only_track_leaves_an_empty_playlist() {
        let pool = db::test::pool().await;
        let playlist = super::create(&pool, "1", "mix").await.expect("create");
        super::add_tracks(&pool, playlist.id, &[track("only")])
            .await
            .expect("add");

        let listed = super::tracks(&pool, playlist.id).await.expect("list");
        super::remove_track(&pool, listed[0].id)
            .await
            .expect("remove");

        assert_eq!(super::track_count(&pool, playlist.id).await.expect("count"), 0);
        // the playlist itself survives
        assert!(super::find_by_name(&pool, "1", "mix")
            .await
            .expect("find")
            .is_some());
    }

    #[tokio::test]
    async fn deleting_a_playlist_cascades_to_its_tracks() {
        let pool = db::test::pool().await;
        let playlist = super::create(&pool, "1", "mix").await.expect("create");
        super::add_tracks(&pool, playlist.id, &[track("a"), track("b")])
            .await
            .expect("add");

        super::delete(&pool, playlist.id).await.expect("delete");

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playlist_tracks;")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn share_codes_are_generated_once_and_reused() {
        let pool = db::test::pool().await;
        let playlist = super::create(&pool, "1", "mix").await.expect("create");

        let code = super::ensure_share_code(&pool, &playlist)
            .await
            .expect("code");
        assert_eq!(code.len(), crate::core::konst::misc::SHARE_CODE_LENGTH);

        let reloaded = super::find_by_name(&pool, "1", "mix")
            .await
            .expect("find")
            .expect("row");
        let again = super::ensure_share_code(&pool, &reloaded)
            .await
            .expect("code");
        assert_eq!(code, again);

        let found = super::find_by_share_code(&pool, &code)
            .await
            .expect("find")
            .expect("row");
        assert_eq!(found.id, playlist.id);
    }
}
