use clap::{Parser, Subcommand};
use dockhand_protocol::ProtocolVersion;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Try every known API version and list the ones the daemon answers
    #[command(alias = "ls")]
    Versions {
        /// Print a JSON array instead of one version per line
        #[arg(long)]
        json: bool,
    },

    /// Ping the daemon on one API version
    Ping {
        /// API version to use (defaults to the configured default)
        #[arg(short = 'a', long)]
        api_version: Option<ProtocolVersion>,
    },

    /// Show the daemon's version details
    Info {
        /// API version to use (defaults to the configured default)
        #[arg(short = 'a', long)]
        api_version: Option<ProtocolVersion>,

        #[arg(long)]
        json: bool,
    },

    /// Show or reset the config file
    Config {
        #[arg(long)]
        path: bool,

        #[arg(long)]
        reset: bool,
    },

    /// Tail the newest log file
    Logs {
        #[arg(short = 'n', long, default_value_t = 50)]
        lines: usize,

        #[arg(short, long)]
        follow: bool,
    },
}

#[derive(Debug, Parser)]
#[command(name = "dockhand", version, verbatim_doc_comment)]
/// Find out which API versions a container engine daemon speaks.
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Daemon endpoint, e.g. unix:///var/run/docker.sock or tcp://host:2375
    #[arg(short = 'H', long, global = true)]
    pub host: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}
