use crate::args::{Cli, Commands, ConfigCommand};
use crate::handlers;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    init_logging(&cli.log_level);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => handlers::serve::handle(cli.config.as_deref(), cli.port),
        Commands::Config { command } => match command {
            ConfigCommand::Show => handlers::config::show(cli.config.as_deref(), cli.port),
        },
    }
}

fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
