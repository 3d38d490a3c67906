pub mod cli;
pub mod config;
pub mod router;
pub mod theme;
pub mod views;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
