mod filter;
mod volume;

pub use self::{filter::Filter, volume::Volume};
