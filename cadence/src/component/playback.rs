mod play_pause;
mod seek;
mod skip;
mod stop;

pub use self::{
    play_pause::{play_pause, PlayPause},
    seek::Seek,
    skip::{skip, Skip},
    stop::{stop, Stop},
};
