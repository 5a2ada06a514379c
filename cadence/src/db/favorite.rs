use sqlx::{FromRow, Pool, Sqlite};

#[derive(FromRow, Debug, Clone)]
pub struct Favorite {
    pub id: i64,
    pub user_id: String,
    pub identifier: String,
    pub title: String,
    pub author: String,
    pub length: i64,
    pub uri: String,
}

pub async fn find(
    db: &Pool<Sqlite>,
    user_id: &str,
    identifier: &str,
) -> sqlx::Result<Option<Favorite>> {
    sqlx::query_as(
        "SELECT id, user_id, identifier, title, author, length, uri
        FROM favorites WHERE user_id = ? AND identifier = ?;",
    )
    .bind(user_id)
    .bind(identifier)
    .fetch_optional(db)
    .await
}

pub async fn all_for_user(db: &Pool<Sqlite>, user_id: &str) -> sqlx::Result<Vec<Favorite>> {
    sqlx::query_as(
        "SELECT id, user_id, identifier, title, author, length, uri
        FROM favorites WHERE user_id = ? ORDER BY id;",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn insert(
    db: &Pool<Sqlite>,
    user_id: &str,
    identifier: &str,
    title: &str,
    author: &str,
    length: i64,
    uri: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO favorites (user_id, identifier, title, author, length, uri)
        VALUES (?, ?, ?, ?, ?, ?);",
    )
    .bind(user_id)
    .bind(identifier)
    .bind(title)
    .bind(author)
    .bind(length)
    .bind(uri)
    .execute(db)
    .await?;
    Ok(())
}

/// Returns whether a row was actually removed.
pub async fn remove(db: &Pool<Sqlite>, user_id: &str, identifier: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND identifier = ?;")
        .bind(user_id)
        .bind(identifier)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::db;

    #[tokio::test]
    async fn inserting_then_finding_round_trips() {
        let pool = db::test::pool().await;
        super::insert(&pool, "1", "abc", "Song X", "Artist", 180_000, "https://y/x")
            .await
            .expect("insert");

        let found = super::find(&pool, "1", "abc").await.expect("find");
        let found = found.expect("row must exist");
        assert_eq!(found.title, "Song X");
        assert_eq!(found.length, 180_000);

        assert!(super::find(&pool, "2", "abc")
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_user_identifier_pair_is_rejected() {
        let pool = db::test::pool().await;
        super::insert(&pool, "1", "abc", "Song X", "Artist", 1, "u")
            .await
            .expect("first insert");

        let duplicate = super::insert(&pool, "1", "abc", "Song X", "Artist", 1, "u").await;
        assert!(duplicate.is_err());

        let all = super::all_for_user(&pool, "1").await.expect("list");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn removing_reports_whether_anything_was_deleted() {
        let pool = db::test::pool().await;
        super::insert(&pool, "1", "abc", "t", "a", 1, "u")
            .await
            .expect("insert");

        assert!(super::remove(&pool, "1", "abc").await.expect("remove"));
        assert!(!super::remove(&pool, "1", "abc").await.expect("remove"));
    }
}
