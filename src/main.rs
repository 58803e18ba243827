use anyhow::Result;
use clap::Parser;
use console::style;
use log::{info, warn};
use rust_i18n::t;
use video_batch_encoder::cli::Cli;
use video_batch_encoder::init;
use video_batch_encoder::signal::setup_shutdown_signal;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> Result<()> {
    init::init();
    let cli = Cli::parse();
    let shutdown_signal = setup_shutdown_signal()?;

    if let Err(e) = video_batch_encoder::run(&cli, shutdown_signal) {
        warn!("Program error: {e:#}");
        eprintln!("{} {e:#}", style(t!("main.error_prefix")).red().bold());
        std::process::exit(1);
    }

    info!("Program exited normally");
    Ok(())
}
