mod args;
mod commands;
mod handlers;

pub use args::{Cli, Commands, ConfigCommand};
pub use commands::run;
