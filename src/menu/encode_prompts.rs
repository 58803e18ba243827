use crate::component::EncodeRequest;
use crate::config::save::{add_recent_path, save_settings};
use crate::config::{Codec, Config, EncodeProfile};
use crate::tools::validate_directory_exists;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::warn;
use rust_i18n::t;
use std::path::{Path, PathBuf};

/// 互動模式可選的縮小高度，由大到小
pub const DOWNSCALE_HEIGHTS: [u32; 5] = [2160, 1440, 1080, 720, 480];

/// 按 ESC 或取消確認時回傳 None
pub fn prompt_encode_request(term: &Term, config: &mut Config) -> Result<Option<EncodeRequest>> {
    term.clear_screen()?;
    println!("{}", style(t!("encode_prompts.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let theme = ColorfulTheme::default();

    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(t!("encode_prompts.input_dir"))
        .validate_with(|value: &String| {
            validate_directory_exists(Path::new(value.trim())).map_err(|e| e.to_string())
        });
    if let Some(recent) = config.settings.recent_paths.first() {
        input = input.default(recent.clone());
    }
    let input_dir = PathBuf::from(input.interact_text_on(term)?.trim());

    let codec_items: Vec<String> = Codec::ALL
        .iter()
        .map(|codec| {
            config
                .codec_table
                .spec(*codec)
                .map_or_else(|_| codec.to_string(), |spec| format!("{codec} ({})", spec.encoder))
        })
        .collect();
    let default_codec = Codec::ALL
        .iter()
        .position(|&c| c == config.settings.default_codec)
        .unwrap_or(0);
    let Some(codec_index) = Select::with_theme(&theme)
        .with_prompt(t!("encode_prompts.codec"))
        .items(&codec_items)
        .default(default_codec)
        .interact_on_opt(term)?
    else {
        return Ok(None);
    };
    let codec = Codec::ALL[codec_index];
    let spec = config.codec_table.spec(codec)?.clone();

    let max_crf = spec.max_crf;
    let crf_error = t!("encode_prompts.crf_out_of_range", max = max_crf).to_string();
    let crf = Input::<u8>::with_theme(&theme)
        .with_prompt(t!("encode_prompts.crf", max = max_crf))
        .default(spec.default_crf)
        .validate_with(move |value: &u8| {
            if *value <= max_crf {
                Ok(())
            } else {
                Err(crf_error.clone())
            }
        })
        .interact_text_on(term)?;

    let default_preset = spec
        .presets
        .iter()
        .position(|p| p == &spec.default_preset)
        .unwrap_or(0);
    let Some(preset_index) = Select::with_theme(&theme)
        .with_prompt(t!("encode_prompts.preset"))
        .items(&spec.presets)
        .default(default_preset)
        .interact_on_opt(term)?
    else {
        return Ok(None);
    };

    let mut downscale_items = vec![t!("encode_prompts.no_downscale").to_string()];
    downscale_items.extend(DOWNSCALE_HEIGHTS.iter().map(|h| format!("{h}p")));
    let Some(downscale_index) = Select::with_theme(&theme)
        .with_prompt(t!("encode_prompts.downscale"))
        .items(&downscale_items)
        .default(0)
        .interact_on_opt(term)?
    else {
        return Ok(None);
    };
    let max_height = downscale_index
        .checked_sub(1)
        .map(|index| DOWNSCALE_HEIGHTS[index]);

    let recursive = Confirm::with_theme(&theme)
        .with_prompt(t!("encode_prompts.recursive"))
        .default(false)
        .interact_on(term)?;

    let profile = EncodeProfile::resolve(
        &config.codec_table,
        codec,
        Some(crf),
        Some(&spec.presets[preset_index]),
        max_height,
    )?;

    println!();
    println!(
        "{}",
        t!(
            "encode_prompts.summary",
            path = input_dir.display(),
            encoder = &spec.encoder,
            crf = profile.crf,
            preset = &profile.preset
        )
    );
    if !Confirm::with_theme(&theme)
        .with_prompt(t!("encode_prompts.confirm"))
        .default(true)
        .interact_on(term)?
    {
        return Ok(None);
    }

    add_recent_path(&mut config.settings, &input_dir.to_string_lossy());
    config.settings.default_codec = codec;
    if let Err(e) = save_settings(&config.settings) {
        warn!("Unable to save settings: {e:#}");
    }

    Ok(Some(EncodeRequest {
        input_dir,
        profile,
        jobs: config.settings.jobs.max(1),
        recursive,
        exclude: None,
        verify: config.settings.verify,
        overwrite: false,
        dry_run: false,
        show_progress: true,
    }))
}
