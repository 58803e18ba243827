use anyhow::{Result, bail};
use rust_i18n::t;
use std::process::{Command, Stdio};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

#[must_use]
pub fn binary_available(binary: &str) -> bool {
    Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

#[must_use]
pub fn ffmpeg_available() -> bool {
    binary_available(FFMPEG)
}

#[must_use]
pub fn ffprobe_available() -> bool {
    binary_available(FFPROBE)
}

/// 兩者缺一即無法轉檔
pub fn require_binaries() -> Result<()> {
    if !ffmpeg_available() {
        bail!("{}", t!("errors.binary_missing", binary = FFMPEG));
    }
    if !ffprobe_available() {
        bail!("{}", t!("errors.binary_missing", binary = FFPROBE));
    }
    Ok(())
}
