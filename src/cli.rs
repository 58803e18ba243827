use crate::component::EncodeRequest;
use crate::config::{Codec, Config, EncodeProfile, Language, VerifyMode};
use anyhow::{Context, Result};
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};

/// Batch-encode every video in a directory with ffmpeg (HEVC or AV1)
#[derive(Debug, Parser)]
#[command(name = "video_batch_encoder", version, about)]
pub struct Cli {
    /// Directory with the videos to encode; omit it to choose everything interactively
    pub input_dir: Option<PathBuf>,

    /// Codec to encode with (defaults to the one in settings.json)
    #[arg(value_enum)]
    pub codec: Option<Codec>,

    /// Constant Rate Factor (lower is higher quality)
    #[arg(long)]
    pub crf: Option<u8>,

    /// Encoder preset (x265 preset name for hevc, 0-13 for av1)
    #[arg(long)]
    pub preset: Option<String>,

    /// Downscale videos taller than this height, keeping the aspect ratio
    #[arg(long, value_name = "HEIGHT")]
    pub max_height: Option<u32>,

    /// Number of files to encode at the same time
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Also encode videos in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Skip files whose name matches this regular expression
    #[arg(long, value_name = "REGEX")]
    pub exclude: Option<String>,

    /// How to check each encoded file before keeping it
    #[arg(long, value_enum)]
    pub verify: Option<VerifyMode>,

    /// Encode again even if the output file already exists
    #[arg(long)]
    pub overwrite: bool,

    /// Print the ffmpeg commands without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Interface language
    #[arg(long, value_enum)]
    pub language: Option<Language>,

    /// Disable the live progress bars
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// 命令列參數優先於設定檔
    pub fn to_request(&self, config: &Config, input_dir: &Path) -> Result<EncodeRequest> {
        let settings = &config.settings;
        let codec = self.codec.unwrap_or(settings.default_codec);
        let profile = EncodeProfile::resolve(
            &config.codec_table,
            codec,
            self.crf,
            self.preset.as_deref(),
            self.max_height,
        )?;

        let exclude = self
            .exclude
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern)
                    .with_context(|| format!("Invalid exclude pattern '{pattern}'"))
            })
            .transpose()?;

        Ok(EncodeRequest {
            input_dir: input_dir.to_path_buf(),
            profile,
            jobs: self.jobs.map_or(settings.jobs, usize::from).max(1),
            recursive: self.recursive,
            exclude,
            verify: self.verify.unwrap_or(settings.verify),
            overwrite: self.overwrite,
            dry_run: self.dry_run,
            show_progress: !self.no_progress,
        })
    }
}
