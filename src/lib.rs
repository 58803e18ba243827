pub mod cli;
pub mod component;
pub mod config;
pub mod init;
pub mod menu;
pub mod signal;
pub mod tools;

rust_i18n::i18n!("locales", fallback = "en-US");

use crate::cli::Cli;
use crate::component::BatchEncoder;
use crate::config::Config;
use anyhow::{Result, bail};
use console::{Term, style};
use log::info;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn pause(term: &Term) -> Result<()> {
    println!("\n{}", style(t!("common.press_enter")).dim());
    term.read_line()?;
    Ok(())
}

/// 有輸入目錄時直接執行，否則進入互動模式
pub fn run(cli: &Cli, shutdown_signal: Arc<AtomicBool>) -> Result<()> {
    let mut config = Config::new()?;
    let language = cli.language.unwrap_or(config.settings.language);
    rust_i18n::set_locale(language.as_str());

    let Some(input_dir) = &cli.input_dir else {
        let term = Term::stdout();
        return menu::show_main_menu(&term, &shutdown_signal, &mut config);
    };

    let request = cli.to_request(&config, input_dir)?;
    info!(
        "Encoding {} with {} (crf {}, preset {})",
        request.input_dir.display(),
        request.profile.codec,
        request.profile.crf,
        request.profile.preset
    );

    let encoder = BatchEncoder::new(config, shutdown_signal);
    let report = encoder.run(&request)?;
    if report.failed > 0 {
        bail!("{}", t!("errors.jobs_failed", count = report.failed));
    }
    Ok(())
}
