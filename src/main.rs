pub mod action;
pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod constants;
pub mod headless;
pub mod pages;
pub mod simulation;
pub mod tui;
pub mod utils;

use clap::Parser;
use color_eyre::eyre::Result;

use crate::{
    app::App,
    cli::Cli,
    config::Config,
    headless::{run_headless, HeadlessOptions},
    utils::{initialize_logging, initialize_panic_handler},
};

async fn tokio_main() -> Result<()> {
    initialize_logging()?;

    initialize_panic_handler()?;

    let args = Cli::parse();
    if args.headless {
        let config = Config::new()?;
        let mut stdout = std::io::stdout().lock();
        run_headless(config.game, HeadlessOptions::from(&args), &mut stdout)?;
        return Ok(());
    }

    let mut app = App::new(args.frame_rate, args.seed)?;
    app.run().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = tokio_main().await {
        eprintln!("{} error: Something went wrong", env!("CARGO_PKG_NAME"));
        Err(e)
    } else {
        Ok(())
    }
}
