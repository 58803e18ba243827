use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const MAX_RECENT_PATHS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Hevc,
    Av1,
}

impl Codec {
    pub const ALL: [Self; 2] = [Self::Hevc, Self::Av1];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hevc => "hevc",
            Self::Av1 => "av1",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 單一編碼器的參數範圍與預設值
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecSpec {
    pub encoder: String,
    pub extension: String,
    pub default_crf: u8,
    pub max_crf: u8,
    pub default_preset: String,
    pub presets: Vec<String>,
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl CodecSpec {
    #[must_use]
    pub fn accepts_preset(&self, preset: &str) -> bool {
        self.presets.iter().any(|p| p.eq_ignore_ascii_case(preset))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct CodecTable {
    pub(crate) entries: HashMap<Codec, CodecSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    #[value(name = "en-US")]
    EnUs,
    #[serde(rename = "es-ES")]
    #[value(name = "es-ES")]
    EsEs,
}

impl Language {
    pub const ALL: [Self; 2] = [Self::EnUs, Self::EsEs];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::EsEs => "es-ES",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::EsEs => write!(f, "Español"),
        }
    }
}

/// 編碼後的驗證方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VerifyMode {
    Off,
    #[default]
    Duration,
    Decode,
    Both,
}

impl VerifyMode {
    pub const ALL: [Self; 4] = [Self::Off, Self::Duration, Self::Decode, Self::Both];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Duration => "duration",
            Self::Decode => "decode",
            Self::Both => "both",
        }
    }

    #[must_use]
    pub const fn checks_duration(self) -> bool {
        matches!(self, Self::Duration | Self::Both)
    }

    #[must_use]
    pub const fn checks_decode(self) -> bool {
        matches!(self, Self::Decode | Self::Both)
    }
}

impl fmt::Display for VerifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_jobs() -> usize {
    1
}

fn default_cpu_threshold() -> f32 {
    95.0
}

fn default_video_extensions() -> Vec<String> {
    [".mp4", ".mov", ".mkv", ".avi"]
        .iter()
        .map(|ext| (*ext).to_string())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_codec")]
    pub default_codec: Codec,
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_cpu_threshold")]
    pub cpu_threshold: f32,
    #[serde(default)]
    pub verify: VerifyMode,
    #[serde(default)]
    pub log_successes: bool,
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    #[serde(default)]
    pub recent_paths: Vec<String>,
}

const fn default_codec() -> Codec {
    Codec::Hevc
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            default_codec: default_codec(),
            jobs: default_jobs(),
            cpu_threshold: default_cpu_threshold(),
            verify: VerifyMode::default(),
            log_successes: false,
            video_extensions: default_video_extensions(),
            recent_paths: Vec::new(),
        }
    }
}

impl UserSettings {
    /// 副檔名一律以小寫、含前導點的形式比對
    #[must_use]
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.video_extensions
            .iter()
            .map(|ext| {
                let ext = ext.trim().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub codec_table: CodecTable,
    pub settings: UserSettings,
}
