mod cli;
mod compare;
mod config;
mod coordinator;
mod file_ops;
mod gui;
mod hashers;
mod logging;
mod models;
mod utils;

use anyhow::{anyhow, Result};
use clap::Parser;
use iced::{window, Size};

use crate::coordinator::ChecksumCoordinator;
use crate::models::MatchOutcome;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    let mut config = config::load(args.config.as_deref())?;
    args.apply_to(&mut config)?;
    logging::init_logging(config.log_filter.as_deref())?;

    // Digest tasks run here; the window's own executor only awaits their completion.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("verifile-hash")
        .enable_all()
        .build()?;
    let coordinator = ChecksumCoordinator::new(runtime.handle().clone(), config.chunk_size);
    let expected = args.expected_value()?;

    if args.no_gui {
        let file = args.file.clone().unwrap_or_default();
        let outcome = cli::run_headless(&coordinator, file, &expected)?;
        runtime.shutdown_background();
        if outcome == MatchOutcome::NoMatch {
            std::process::exit(1);
        }
        return Ok(());
    }

    let file = args.file.clone();
    let dark_mode = config.dark_mode;
    let result = iced::application(
        "VeriFile - Checksum",
        gui::VeriFileApp::update,
        gui::VeriFileApp::view,
    )
    .subscription(gui::VeriFileApp::subscription)
    .window(window::Settings {
        size: Size::new(900.0, 420.0),
        resizable: true,
        ..window::Settings::default()
    })
    .run_with(move || gui::VeriFileApp::new(coordinator, file, expected, dark_mode));

    runtime.shutdown_background();
    result.map_err(|e| anyhow!("{e}"))
}
