use sqlx::{FromRow, Pool, Sqlite};

#[derive(FromRow, Debug, Clone)]
pub struct Grant {
    pub id: i64,
    pub user_id: String,
    pub username: String,
    pub granted_by: String,
    pub granted_by_username: String,
    pub expires_at: Option<i64>,
    pub duration: String,
}

fn now() -> i64 {
    i64::try_from(cadence_ext::unix_time().as_secs()).unwrap_or(i64::MAX)
}

/// Whether the user holds an unexpired grant.
///
/// Expiry is lazy: an expired grant is deleted here, on lookup, rather
/// than by a background sweep.
pub async fn is_active(db: &Pool<Sqlite>, user_id: &str) -> sqlx::Result<bool> {
    let grant: Option<Grant> = sqlx::query_as(
        "SELECT id, user_id, username, granted_by, granted_by_username, expires_at, duration
        FROM no_prefix WHERE user_id = ?;",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?;

    let Some(grant) = grant else {
        return Ok(false);
    };

    if grant.expires_at.is_some_and(|at| at < now()) {
        sqlx::query("DELETE FROM no_prefix WHERE id = ?;")
            .bind(grant.id)
            .execute(db)
            .await?;
        return Ok(false);
    }

    Ok(true)
}

pub async fn grant(
    db: &Pool<Sqlite>,
    user_id: &str,
    username: &str,
    granted_by: &str,
    granted_by_username: &str,
    expires_at: Option<i64>,
    duration: &str,
) -> sqlx::Result<()> {
    sqlx::query(
        "INSERT INTO no_prefix
            (user_id, username, granted_by, granted_by_username, expires_at, duration)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            username = excluded.username,
            granted_by = excluded.granted_by,
            granted_by_username = excluded.granted_by_username,
            expires_at = excluded.expires_at,
            duration = excluded.duration;",
    )
    .bind(user_id)
    .bind(username)
    .bind(granted_by)
    .bind(granted_by_username)
    .bind(expires_at)
    .bind(duration)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn revoke(db: &Pool<Sqlite>, user_id: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM no_prefix WHERE user_id = ?;")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn all(db: &Pool<Sqlite>) -> sqlx::Result<Vec<Grant>> {
    sqlx::query("DELETE FROM no_prefix WHERE expires_at IS NOT NULL AND expires_at < ?;")
        .bind(now())
        .execute(db)
        .await?;

    sqlx::query_as(
        "SELECT id, user_id, username, granted_by, granted_by_username, expires_at, duration
        FROM no_prefix ORDER BY id;",
    )
    .fetch_all(db)
    .await
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::db;

    async fn grant_with_expiry(pool: &sqlx::Pool<sqlx::Sqlite>, user: &str, expires_at: Option<i64>) {
        super::grant(pool, user, "someone", "2", "an admin", expires_at, "30d")
            .await
            .expect("grant");
    }

    #[tokio::test]
    async fn permanent_grants_stay_active() {
        let pool = db::test::pool().await;
        grant_with_expiry(&pool, "1", None).await;
        assert!(super::is_active(&pool, "1").await.expect("lookup"));
        assert!(super::is_active(&pool, "1").await.expect("lookup"));
    }

    #[tokio::test]
    async fn expired_grants_are_deleted_on_lookup() {
        let pool = db::test::pool().await;
        grant_with_expiry(&pool, "1", Some(1)).await;

        assert!(!super::is_active(&pool, "1").await.expect("lookup"));
        // the lazy expiry removed the row entirely
        assert!(super::all(&pool).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn regranting_replaces_the_existing_row() {
        let pool = db::test::pool().await;
        grant_with_expiry(&pool, "1", Some(1)).await;
        grant_with_expiry(&pool, "1", None).await;

        let grants = super::all(&pool).await.expect("list");
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].expires_at, None);
        assert!(super::is_active(&pool, "1").await.expect("lookup"));
    }

    #[tokio::test]
    async fn revoking_a_missing_grant_is_not_an_error() {
        let pool = db::test::pool().await;
        assert!(!super::revoke(&pool, "1").await.expect("revoke"));
        grant_with_expiry(&pool, "1", None).await;
        assert!(super::revoke(&pool, "1").await.expect("revoke"));
    }
}
