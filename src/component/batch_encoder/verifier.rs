use crate::config::VerifyMode;
use crate::tools::{FFMPEG, format_mmss, get_video_info};
use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// 原始與輸出影片長度允許的差距（秒）
pub const DURATION_MARGIN_SECONDS: f64 = 0.5;

pub fn verify_output(mode: VerifyMode, source_duration: Option<f64>, output: &Path) -> Result<()> {
    if mode.checks_duration() {
        let output_duration = get_video_info(output)
            .ok()
            .and_then(|info| info.duration_seconds);
        check_duration(source_duration, output_duration, DURATION_MARGIN_SECONDS)?;
    }

    if mode.checks_decode() {
        check_decode(output)?;
    }

    Ok(())
}

/// 來源長度未知時略過；輸出長度未知視為失敗
pub fn check_duration(
    source_duration: Option<f64>,
    output_duration: Option<f64>,
    margin: f64,
) -> Result<()> {
    let Some(source) = source_duration else {
        debug!("Source duration unknown, skipping duration check");
        return Ok(());
    };
    let Some(output) = output_duration else {
        bail!("Could not read the duration of the encoded file");
    };

    if (output - source).abs() > margin {
        bail!(
            "Duration differs by more than {margin}s (original: {}, encoded: {})",
            format_mmss(source),
            format_mmss(output)
        );
    }
    Ok(())
}

/// 完整解碼一次輸出檔，ffmpeg 回傳失敗即不通過
pub fn check_decode(output: &Path) -> Result<()> {
    let result = Command::new(FFMPEG)
        .args(["-hide_banner", "-nostdin", "-v", "error", "-i"])
        .arg(output)
        .args(["-f", "null", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .with_context(|| format!("Failed to run decode check on {}", output.display()))?;

    decode_outcome(result.status, &String::from_utf8_lossy(&result.stderr))
}

/// 只看結束碼；stderr 僅作為錯誤內容
fn decode_outcome(status: ExitStatus, stderr: &str) -> Result<()> {
    if status.success() {
        if !stderr.trim().is_empty() {
            debug!("Decode check passed with warnings: {}", stderr.trim());
        }
        return Ok(());
    }

    let details = stderr.trim();
    if details.is_empty() {
        bail!("Decode check failed with {status}");
    }
    bail!("Decode check failed:\n{details}");
}
