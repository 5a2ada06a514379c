use std::time::Duration;

pub const NOW_PLAYING_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

pub const AUTOPLAY_MAX_TRACKS: usize = 6;

pub const AUTOCOMPLETE_CACHE_SIZE: u64 = 1_000;
pub const AUTOCOMPLETE_CACHE_TTL: Duration = Duration::from_secs(300);
pub const AUTOCOMPLETE_LIMIT: usize = 5;

pub const SHARE_CODE_LENGTH: usize = 8;

pub const QUEUE_PAGE_SIZE: usize = 10;

pub const LYRICS_MAX_LENGTH: usize = 3_900;
