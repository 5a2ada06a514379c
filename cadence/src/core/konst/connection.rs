use std::time::Duration;

pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60);
pub const GET_LAVALINK_CONNECTION_INFO_TIMEOUT: Duration = Duration::from_millis(2_000);
