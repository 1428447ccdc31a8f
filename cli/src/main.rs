mod cli;
mod commands;
mod config;
mod logging;

use clap::Parser;
use color_eyre::eyre::Result;

use cli::{Cli, Commands};
use config::{ensure_dirs, LogLevel, UserConfig};
use logging::LogMode;

fn main() -> Result<()> {
    color_eyre::install()?;
    let _ = ensure_dirs();

    let cli = Cli::parse();
    let config = UserConfig::load();
    let log_level_override = cli.log_level.as_deref().map(LogLevel::from_str);
    let _guard = logging::init(
        config.log_level,
        LogMode::from_config(config.log_to_file),
        log_level_override,
    );

    match cli.command {
        Commands::Versions { json } => {
            let factory = commands::build_factory(&config, cli.host.as_deref());
            commands::versions::run(&factory, json)
        }
        Commands::Ping { api_version } => {
            let factory = commands::build_factory(&config, cli.host.as_deref());
            commands::ping::run(&factory, api_version)
        }
        Commands::Info { api_version, json } => {
            let factory = commands::build_factory(&config, cli.host.as_deref());
            commands::info::run(&factory, api_version, json)
        }
        Commands::Config { path, reset } => commands::config::run(path, reset),
        Commands::Logs { lines, follow } => commands::logs::run(lines, follow),
    }
}
