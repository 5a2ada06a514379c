pub mod image;
pub mod pretty;
pub mod time;

pub use ::image::ImageError;
pub use time::unix::unix as unix_time;
