//! 解析 ffmpeg `-progress pipe:1` 的輸出
//!
//! 每個區塊由多行 `key=value` 組成，並以 `progress=continue` 或
//! `progress=end` 結尾。

use crate::tools::{bytes_to_mb, format_mmss};
use regex::Regex;
use rust_i18n::t;
use std::sync::LazyLock;

static OUT_TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})(?:\.(\d{1,6}))?$").expect("valid out_time pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Updated,
    BlockEnd,
    End,
    Ignored,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodeProgress {
    pub elapsed_us: u64,
    pub fps: u32,
    pub speed: Option<f64>,
    pub total_size: Option<u64>,
    pub finished: bool,
    has_numeric_time: bool,
}

impl EncodeProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_line(&mut self, line: &str) -> ProgressEvent {
        let Some((key, value)) = line.trim().split_once('=') else {
            return ProgressEvent::Ignored;
        };
        let value = value.trim();

        match key.trim() {
            "fps" => {
                // 無法解析時歸零
                self.fps = value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .map_or(0, |v| v.trunc() as u32);
                ProgressEvent::Updated
            }
            // ffmpeg 的 out_time_ms 實際單位也是微秒
            "out_time_us" | "out_time_ms" => match value.parse::<u64>() {
                Ok(us) => {
                    self.elapsed_us = us;
                    self.has_numeric_time = true;
                    ProgressEvent::Updated
                }
                Err(_) => ProgressEvent::Ignored,
            },
            "out_time" if !self.has_numeric_time => match parse_out_time(value) {
                Some(us) => {
                    self.elapsed_us = us;
                    ProgressEvent::Updated
                }
                None => ProgressEvent::Ignored,
            },
            "speed" => match parse_speed(value) {
                Some(speed) => {
                    self.speed = Some(speed);
                    ProgressEvent::Updated
                }
                None => ProgressEvent::Ignored,
            },
            "total_size" => match value.parse::<u64>() {
                Ok(size) => {
                    self.total_size = Some(size);
                    ProgressEvent::Updated
                }
                Err(_) => ProgressEvent::Ignored,
            },
            "progress" if value == "end" => {
                self.finished = true;
                ProgressEvent::End
            }
            "progress" => ProgressEvent::BlockEnd,
            _ => ProgressEvent::Ignored,
        }
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_us as f64 / 1_000_000.0
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_us / 1000
    }

    /// 0 到 100；長度未知時為 0
    #[must_use]
    pub fn percent(&self, duration_seconds: Option<f64>) -> f64 {
        match duration_seconds {
            Some(total) if total > 0.0 => (self.elapsed_seconds() / total * 100.0).min(100.0),
            _ => 0.0,
        }
    }

    /// 例如 `[10%] 01:05/10:00 - Vel: 48 FPS - 1.62x - 12.5 MB`
    #[must_use]
    pub fn status_line(&self, duration_seconds: Option<f64>) -> String {
        let total = duration_seconds.map_or_else(|| "--:--".to_string(), format_mmss);
        let percent = format!("{:.0}", self.percent(duration_seconds).floor());
        let mut line = t!(
            "progress.status",
            percent = percent,
            elapsed = format_mmss(self.elapsed_seconds()),
            total = total,
            fps = self.fps
        )
        .to_string();
        if let Some(speed) = self.speed {
            line.push_str(&format!(" - {speed:.2}x"));
        }
        if let Some(size) = self.total_size {
            line.push_str(&format!(" - {:.1} MB", bytes_to_mb(size)));
        }
        line
    }
}

/// `HH:MM:SS.micro` 轉為微秒
fn parse_out_time(raw: &str) -> Option<u64> {
    let caps = OUT_TIME_PATTERN.captures(raw)?;
    let h: u64 = caps.get(1)?.as_str().parse().ok()?;
    let m: u64 = caps.get(2)?.as_str().parse().ok()?;
    let s: u64 = caps.get(3)?.as_str().parse().ok()?;
    let micros = caps.get(4).map_or(Some(0), |frac| {
        let digits = frac.as_str();
        let value: u64 = digits.parse().ok()?;
        Some(value * 10u64.pow(6 - digits.len() as u32))
    })?;
    Some((h * 3600 + m * 60 + s) * 1_000_000 + micros)
}

fn parse_speed(raw: &str) -> Option<f64> {
    raw.trim_end_matches('x')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_BLOCK: &str = "frame=240
fps=47.91
stream_0_0_q=28.0
bitrate=1200.5kbits/s
total_size=1048576
out_time_us=8008000
out_time_ms=8008000
out_time=00:00:08.008000
dup_frames=0
drop_frames=0
speed=1.6x
progress=continue";

    #[test]
    fn test_parse_full_block() {
        let mut progress = EncodeProgress::new();
        let events: Vec<_> = SAMPLE_BLOCK
            .lines()
            .map(|line| progress.apply_line(line))
            .collect();

        assert_eq!(events.last(), Some(&ProgressEvent::BlockEnd));
        assert_eq!(progress.fps, 47);
        assert_eq!(progress.elapsed_us, 8_008_000);
        assert_eq!(progress.elapsed_ms(), 8008);
        assert_eq!(progress.total_size, Some(1_048_576));
        assert_eq!(progress.speed, Some(1.6));
        assert!(!progress.finished);
    }

    #[test]
    fn test_progress_end() {
        let mut progress = EncodeProgress::new();
        assert_eq!(progress.apply_line("progress=end\n"), ProgressEvent::End);
        assert!(progress.finished);
    }

    #[test]
    fn test_ignores_lines_without_separator_and_unknown_keys() {
        let mut progress = EncodeProgress::new();
        assert_eq!(progress.apply_line("garbage"), ProgressEvent::Ignored);
        assert_eq!(progress.apply_line(""), ProgressEvent::Ignored);
        assert_eq!(progress.apply_line("bitrate=N/A"), ProgressEvent::Ignored);
        assert_eq!(progress, EncodeProgress::new());
    }

    #[test]
    fn test_unparseable_fps_resets_to_zero() {
        let mut progress = EncodeProgress::new();
        progress.apply_line("fps=30.0");
        assert_eq!(progress.fps, 30);
        progress.apply_line("fps=N/A");
        assert_eq!(progress.fps, 0);
    }

    #[test]
    fn test_na_time_and_speed_are_ignored() {
        let mut progress = EncodeProgress::new();
        progress.apply_line("out_time_ms=5000000");
        assert_eq!(progress.apply_line("out_time_ms=N/A"), ProgressEvent::Ignored);
        assert_eq!(progress.apply_line("speed=N/A"), ProgressEvent::Ignored);
        assert_eq!(progress.elapsed_us, 5_000_000);
        assert_eq!(progress.speed, None);
    }

    #[test]
    fn test_out_time_fallback_when_numeric_keys_absent() {
        let mut progress = EncodeProgress::new();
        progress.apply_line("out_time=01:02:03.5");
        assert_eq!(progress.elapsed_us, 3_723_500_000);

        progress.apply_line("out_time_us=1000000");
        progress.apply_line("out_time=00:00:09.000000");
        assert_eq!(progress.elapsed_us, 1_000_000);
    }

    #[test]
    fn test_parse_out_time_rejects_invalid() {
        assert_eq!(parse_out_time("N/A"), None);
        assert_eq!(parse_out_time("-00:00:01.000000"), None);
        assert_eq!(parse_out_time("00:00:02"), Some(2_000_000));
    }

    #[test]
    fn test_percent_is_clamped() {
        let mut progress = EncodeProgress::new();
        progress.apply_line("out_time_us=30000000");
        assert!((progress.percent(Some(60.0)) - 50.0).abs() < 1e-9);
        assert!((progress.percent(Some(20.0)) - 100.0).abs() < 1e-9);
        assert_eq!(progress.percent(None), 0.0);
        assert_eq!(progress.percent(Some(0.0)), 0.0);
    }

    #[test]
    fn test_status_line() {
        let mut progress = EncodeProgress::new();
        progress.apply_line("out_time_us=65000000");
        progress.apply_line("fps=48.7");
        assert_eq!(
            progress.status_line(Some(600.0)),
            "[10%] 01:05/10:00 - Vel: 48 FPS"
        );

        progress.apply_line("speed=1.6x");
        assert_eq!(
            progress.status_line(None),
            "[0%] 01:05/--:-- - Vel: 48 FPS - 1.60x"
        );
    }

    #[test]
    fn test_status_line_shows_written_size() {
        let mut progress = EncodeProgress::new();
        progress.apply_line("out_time_us=30000000");
        progress.apply_line("fps=25");
        progress.apply_line("total_size=5242880");
        assert_eq!(
            progress.status_line(Some(30.0)),
            "[100%] 00:30/00:30 - Vel: 25 FPS - 5.0 MB"
        );
    }
}
