pub mod favorite;
pub mod no_prefix;
pub mod playlist;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[cfg(test)]
pub(crate) mod test {
    use sqlx::{
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
        Pool, Sqlite,
    };

    pub async fn pool() -> Pool<Sqlite> {
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("in-memory sqlite url must parse")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("in-memory sqlite must connect");
        super::MIGRATOR
            .run(&pool)
            .await
            .expect("migrations must apply");
        pool
    }
}
