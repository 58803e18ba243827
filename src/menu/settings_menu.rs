use crate::config::save::save_settings;
use crate::config::{Codec, Config, Language, VerifyMode};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::fmt::Display;

pub fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_codec", current = config.settings.default_codec),
            t!("settings.opt_jobs", current = config.settings.jobs),
            t!("settings.opt_verify", current = config.settings.verify),
            t!("settings.opt_language", current = config.settings.language),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        let changed = match selection {
            Some(0) => choose(term, &Codec::ALL, &mut config.settings.default_codec)?,
            Some(1) => choose_jobs(term, config)?,
            Some(2) => choose(term, &VerifyMode::ALL, &mut config.settings.verify)?,
            Some(3) => {
                let changed = choose(term, &Language::ALL, &mut config.settings.language)?;
                rust_i18n::set_locale(config.settings.language.as_str());
                changed
            }
            // ESC 或返回
            _ => break,
        };

        if changed {
            save_settings(&config.settings)?;
            println!("\n{}", style(t!("settings.saved")).green());
            std::thread::sleep(std::time::Duration::from_secs(1));
        }
    }

    Ok(())
}

/// 從固定選項中選一個，值有變動時回傳 true
fn choose<T: Copy + PartialEq + Display>(term: &Term, values: &[T], current: &mut T) -> Result<bool> {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    let default_index = values.iter().position(|v| v == current).unwrap_or(0);

    let Some(index) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.choose"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?
    else {
        return Ok(false);
    };

    let selected = values[index];
    if selected == *current {
        return Ok(false);
    }
    *current = selected;
    Ok(true)
}

fn choose_jobs(term: &Term, config: &mut Config) -> Result<bool> {
    let jobs = Input::<usize>::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.jobs_prompt"))
        .default(config.settings.jobs)
        .validate_with(|value: &usize| {
            if *value >= 1 {
                Ok(())
            } else {
                Err(t!("settings.jobs_invalid").to_string())
            }
        })
        .interact_text_on(term)?;

    if jobs == config.settings.jobs {
        return Ok(false);
    }
    config.settings.jobs = jobs;
    Ok(true)
}
