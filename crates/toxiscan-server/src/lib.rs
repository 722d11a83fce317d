pub mod cli;
pub mod commands;
pub mod config;
pub mod mock;
pub mod server;
pub mod state;

pub use cli::*;
pub use config::*;
pub use state::*;
