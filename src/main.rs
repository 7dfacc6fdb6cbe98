use anyhow::Result;
use clap::Parser;

use kortar::cli::Cli;
use kortar::{app, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if !app::run(cli).await? {
        std::process::exit(1);
    }
    Ok(())
}
