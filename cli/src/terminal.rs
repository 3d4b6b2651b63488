pub mod banner;
pub mod logging;
pub mod print;
