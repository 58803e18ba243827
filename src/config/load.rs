use crate::config::types::{Config, CodecTable, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的編碼器參數表（不需要外部檔案）
const CODEC_TABLE_JSON: &str = include_str!("data/codec_table.json");

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        let codec_table = CodecTable::embedded()?;
        let settings = match load_settings(Path::new(SETTINGS_FILE)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Using default settings: {e:#}");
                UserSettings::default()
            }
        };

        Ok(Self {
            codec_table,
            settings,
        })
    }
}

impl CodecTable {
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(CODEC_TABLE_JSON).context("Failed to parse embedded codec table")
    }
}

pub fn load_settings(path: &Path) -> Result<UserSettings> {
    if !path.exists() {
        return Ok(UserSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))
}
