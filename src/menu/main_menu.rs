use crate::component::BatchEncoder;
use crate::config::Config;
use crate::menu::encode_prompts::prompt_encode_request;
use crate::menu::settings_menu::show_settings_menu;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use log::warn;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    loop {
        if shutdown_signal.load(Ordering::SeqCst) {
            break;
        }
        term.clear_screen()?;

        println!("{}", style(t!("main_menu.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("main_menu.opt_encode"),
            t!("main_menu.opt_settings"),
            t!("main_menu.exit"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("main_menu.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => run_batch_encoder(term, shutdown_signal, config)?,
            Some(1) => show_settings_menu(term, config)?,
            // ESC 或離開
            _ => break,
        }
    }

    term.clear_screen()?;
    println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
    Ok(())
}

fn run_batch_encoder(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let Some(request) = prompt_encode_request(term, config)? else {
        return Ok(());
    };

    let encoder = BatchEncoder::new(config.clone(), Arc::clone(shutdown_signal));
    match encoder.run(&request) {
        Ok(report) if report.failed > 0 => {
            warn!("{} file(s) failed to encode", report.failed);
        }
        Ok(_) => {}
        Err(e) => {
            eprintln!("{} {e:#}", style(t!("main.error_prefix")).red().bold());
        }
    }

    pause(term)?;
    Ok(())
}
