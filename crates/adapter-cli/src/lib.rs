//! Command-line front end for the channel adapter.

pub mod config_commands;
pub mod logging;
pub mod parser;

pub use logging::init_tracing;
pub use parser::{Cli, Commands, ServeArgs};
