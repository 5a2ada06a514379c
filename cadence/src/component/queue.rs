mod autoplay;
mod clear;
mod r#move;
mod play;
mod remove;
mod repeat;
mod shuffle;
mod view;

pub use self::{
    autoplay::{toggle_autoplay, Autoplay},
    clear::Clear,
    play::{autocomplete as play_autocomplete, enqueue_tracks, ensure_player, play_query, Play},
    r#move::Move,
    remove::Remove,
    repeat::{cycle_repeat, Repeat},
    shuffle::{shuffle_queue, Shuffle},
    view::{view_queue, Queue},
};
