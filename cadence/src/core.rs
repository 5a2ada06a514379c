pub mod konst;
pub mod model;
pub mod statik;
pub mod traced;
