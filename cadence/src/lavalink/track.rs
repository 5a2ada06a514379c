mod end;
mod start;

pub(super) use self::{end::impl_end, start::impl_start};
