//! CLI argument assembly and top-level parser.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use gepn_node_core::{
    args::{AuthArgs, DatabaseArgs, HttpArgs, LogArgs},
    config::GepnConfig,
    logging, version,
};
use tracing::info;

use crate::commands;

/// GEPN - police records authentication and authorization backend
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Logging configuration (applies to all subcommands).
    #[command(flatten)]
    pub(crate) logs: LogArgs,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Run the API server.
    Node(NodeArgs),
    /// Print the effective configuration as TOML, secrets redacted.
    Config(NodeArgs),
}

/// Settings shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct NodeArgs {
    /// Path to a TOML configuration file.
    #[arg(long, short = 'c', env = "GEPN_CONFIG", value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    #[command(flatten)]
    pub(crate) http: HttpArgs,

    #[command(flatten)]
    pub(crate) database: DatabaseArgs,

    #[command(flatten)]
    pub(crate) auth: AuthArgs,
}

impl NodeArgs {
    /// Loads the layered configuration and applies the CLI overrides.
    pub(crate) fn resolve(&self) -> eyre::Result<GepnConfig> {
        let mut config = GepnConfig::load(self.config.as_deref())?;
        config.apply_args(&self.http, &self.database, &self.auth);
        Ok(config)
    }
}

pub(crate) async fn run() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Node(args) => {
            logging::init_logging(&cli.logs)?;
            info!("Starting GEPN {}", version::VERSION);
            commands::node::run(args.resolve()?).await
        }
        Commands::Config(args) => commands::config::run(&args.resolve()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "gepn",
            "-v",
            "node",
            "--http.port",
            "9090",
            "--db.uri",
            "file:///tmp/gepn",
            "--auth.degraded-mode",
        ])
        .unwrap();
        assert_eq!(cli.logs.verbosity, 1);
        let Commands::Node(args) = cli.command else {
            panic!("expected node command");
        };
        assert_eq!(args.http.port, Some(9090));
        assert_eq!(args.database.uri.as_deref(), Some("file:///tmp/gepn"));
        assert!(args.auth.degraded_mode);
    }
}
