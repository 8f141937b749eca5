// src/main.rs

mod cli;
mod core;
mod export;
mod logging;
mod report;
mod webhook;

use cli::Cli;
use color_eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::initialize_logging()?;

    Cli::parse_args().run().await
}
