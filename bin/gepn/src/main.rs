//! GEPN backend binary.

mod cli;
mod commands;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    cli::run().await
}
