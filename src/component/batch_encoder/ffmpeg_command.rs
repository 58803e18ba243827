use super::job::EncodingJob;
use crate::config::{CodecSpec, EncodeProfile};
use crate::tools::FFMPEG;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

/// 來源平均幀率超過此值時，輸出固定為 [`OUTPUT_FPS_CAP`]
pub const FPS_CAP_THRESHOLD: f64 = 239.0;
pub const OUTPUT_FPS_CAP: u32 = 240;

#[must_use]
pub fn output_frame_rate(source_frame_rate: Option<f64>) -> Option<u32> {
    source_frame_rate
        .filter(|fps| *fps > FPS_CAP_THRESHOLD)
        .map(|_| OUTPUT_FPS_CAP)
}

/// 只縮小不放大；寬度依比例並保持偶數
#[must_use]
pub fn scale_filter(max_height: Option<u32>, source_height: Option<u32>) -> Option<String> {
    let max_height = max_height?;
    match source_height {
        Some(height) if height <= max_height => None,
        Some(_) => Some(format!("scale=-2:{max_height}")),
        None => Some(format!("scale=-2:'min(ih,{max_height})'")),
    }
}

pub struct FfmpegCommand {
    args: Vec<OsString>,
}

impl FfmpegCommand {
    #[must_use]
    pub fn new(job: &EncodingJob, profile: &EncodeProfile, spec: &CodecSpec) -> Self {
        Self::for_paths(
            &job.source_path,
            &job.temp_path,
            profile,
            spec,
            job.source_height,
            job.source_frame_rate,
        )
    }

    #[must_use]
    pub fn for_paths(
        source_path: &Path,
        output_path: &Path,
        profile: &EncodeProfile,
        spec: &CodecSpec,
        source_height: Option<u32>,
        source_frame_rate: Option<f64>,
    ) -> Self {
        let crf = profile.crf.to_string();
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            "-nostats",
            "-loglevel",
            "error",
            "-i",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(source_path.as_os_str().to_os_string());

        args.extend(
            [
                "-c:v",
                spec.encoder.as_str(),
                "-crf",
                crf.as_str(),
                "-preset",
                profile.preset.as_str(),
            ]
            .iter()
            .map(OsString::from),
        );
        args.extend(spec.extra_args.iter().map(OsString::from));

        if let Some(filter) = scale_filter(profile.max_height, source_height) {
            args.push("-vf".into());
            args.push(filter.into());
        }

        if let Some(fps) = output_frame_rate(source_frame_rate) {
            args.push("-r".into());
            args.push(fps.to_string().into());
        }

        args.extend(
            [
                "-c:a",
                "copy",
                "-map_metadata",
                "0",
                "-y",
                "-progress",
                "pipe:1",
            ]
            .iter()
            .map(OsString::from),
        );
        args.push(output_path.as_os_str().to_os_string());

        Self { args }
    }

    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(FFMPEG);
        cmd.args(&self.args);
        cmd
    }

    /// 以單行、類似 shell 的形式呈現，供 dry-run 與記錄使用
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(FFMPEG.to_string())
            .chain(self.args.iter().map(|arg| shell_quote(&arg.to_string_lossy())))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(value: &str) -> String {
    let is_plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,%".contains(c));
    if is_plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
