use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "argus")]
#[command(about = "Supervise concurrent agentic coding sessions from one live view", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Override the config file path (default: `$ARGUS_HOME/config.toml`, `~/.argus/config.toml`).
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the listen port for `serve`: highest-priority layer over the config file.
    #[arg(long, global = true)]
    pub port: Option<u16>,

    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the supervision daemon: scan transcripts, accept hook events, serve state.
    Serve,

    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective, fully-resolved configuration as TOML.
    Show,
}
