//! Config command - print the effective configuration.

use gepn_node_core::config::GepnConfig;

pub(crate) fn run(config: &GepnConfig) -> eyre::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}
