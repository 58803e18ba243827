use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::tools::FFPROBE;

#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub duration_seconds: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<f64>,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片資訊
pub fn get_video_info(path: &Path) -> Result<VideoInfo> {
    let output = Command::new(FFPROBE)
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to run ffprobe on {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe failed on {}: {}", path.display(), stderr.trim());
    }

    parse_ffprobe_json(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("Unexpected ffprobe output for {}", path.display()))
}

pub fn parse_ffprobe_json(json: &str) -> Result<VideoInfo> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("Invalid ffprobe JSON")?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| anyhow!("No video stream found"))?;

    // 影片長度優先取 format，其次取 stream
    let duration_seconds = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .and_then(parse_positive)
        .or_else(|| video_stream.duration.as_deref().and_then(parse_positive));

    // avg_frame_rate 為 "0/0" 時視為未知，不套用幀率上限
    let frame_rate = video_stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate);

    Ok(VideoInfo {
        duration_seconds,
        width: video_stream.width,
        height: video_stream.height,
        frame_rate,
    })
}

fn parse_positive(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// 解析幀率字串（例如 "30/1"、"239737/1000" 或 "N/A"）
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num_str, den_str)) = rate.split_once('/') {
        let num: f64 = num_str.trim().parse().ok()?;
        let den: f64 = den_str.trim().parse().ok()?;
        if den > 0.0 && num > 0.0 {
            return Some(num / den);
        }
        return None;
    }
    parse_positive(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate_fraction() {
        assert!((parse_frame_rate("30/1").unwrap() - 30.0).abs() < 0.01);
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("239737/1000").unwrap() - 239.737).abs() < 0.001);
    }

    #[test]
    fn test_parse_frame_rate_decimal() {
        assert!((parse_frame_rate("29.97").unwrap() - 29.97).abs() < 0.01);
        assert!((parse_frame_rate("240").unwrap() - 240.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_frame_rate_invalid() {
        assert!(parse_frame_rate("N/A").is_none());
        assert!(parse_frame_rate("30/0").is_none());
        assert!(parse_frame_rate("0/0").is_none());
    }

    #[test]
    fn test_parse_ffprobe_json_prefers_format_duration() {
        let json = r#"{
            "streams": [
                {"codec_type": "audio", "duration": "9.0"},
                {"codec_type": "video", "width": 1920, "height": 1080,
                 "avg_frame_rate": "60000/1001", "r_frame_rate": "60/1", "duration": "10.0"}
            ],
            "format": {"duration": "10.5"}
        }"#;
        let info = parse_ffprobe_json(json).unwrap();
        assert_eq!(info.duration_seconds, Some(10.5));
        assert_eq!(info.width, Some(1920));
        assert_eq!(info.height, Some(1080));
        assert!((info.frame_rate.unwrap() - 59.94).abs() < 0.01);
    }

    #[test]
    fn test_parse_ffprobe_json_fallbacks() {
        let json = r#"{
            "streams": [
                {"codec_type": "video", "avg_frame_rate": "0/0", "r_frame_rate": "25/1",
                 "duration": "4.0"}
            ],
            "format": {"duration": "N/A"}
        }"#;
        let info = parse_ffprobe_json(json).unwrap();
        assert_eq!(info.duration_seconds, Some(4.0));
        assert_eq!(info.height, None);
        assert_eq!(info.frame_rate, None);
    }

    #[test]
    fn test_variable_frame_rate_is_not_capped() {
        // VFR 來源的 r_frame_rate 常是時間基準，例如 1000/1
        let json = r#"{
            "streams": [
                {"codec_type": "video", "height": 720,
                 "avg_frame_rate": "0/0", "r_frame_rate": "1000/1"}
            ],
            "format": {"duration": "12.0"}
        }"#;
        let info = parse_ffprobe_json(json).unwrap();
        assert_eq!(info.frame_rate, None);
        assert_eq!(crate::component::batch_encoder::output_frame_rate(info.frame_rate), None);
    }

    #[test]
    fn test_parse_ffprobe_json_without_video_stream() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {"duration": "3.0"}}"#;
        assert!(parse_ffprobe_json(json).is_err());
    }
}
