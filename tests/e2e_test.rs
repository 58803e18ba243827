//! E2E 測試 - 以 ffmpeg 產生短片並實際轉檔
//!
//! 系統沒有 ffmpeg/ffprobe 時自動跳過

use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tempfile::TempDir;
use video_batch_encoder::component::{BatchEncoder, EncodeRequest};
use video_batch_encoder::config::{
    Codec, CodecTable, Config, EncodeProfile, UserSettings, VerifyMode,
};
use video_batch_encoder::tools::{ffmpeg_available, ffprobe_available, get_video_info};

fn ffmpeg_ready() -> bool {
    if ffmpeg_available() && ffprobe_available() {
        return true;
    }
    println!("跳過測試：找不到 ffmpeg/ffprobe");
    false
}

fn encoder_available(encoder: &str) -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-h", &format!("encoder={encoder}")])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .is_ok_and(|out| {
            out.status.success() && !String::from_utf8_lossy(&out.stdout).contains("not recognized")
        })
}

/// 用 lavfi 產生帶音訊的測試影片
fn generate_clip(path: &Path, seconds: u32, height: u32) {
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-f", "lavfi", "-i"])
        .arg(format!("testsrc=duration={seconds}:size={}x{height}:rate=25", height * 16 / 9))
        .args(["-f", "lavfi", "-i"])
        .arg(format!("sine=frequency=440:duration={seconds}"))
        .args(["-c:v", "mpeg4", "-c:a", "aac", "-shortest"])
        .arg(path)
        .status()
        .unwrap();
    assert!(status.success(), "無法產生測試影片");
}

fn request(input_dir: &Path, codec: Codec, max_height: Option<u32>, verify: VerifyMode) -> EncodeRequest {
    let table = CodecTable::embedded().unwrap();
    let preset = match codec {
        Codec::Hevc => "ultrafast",
        Codec::Av1 => "12",
    };
    EncodeRequest {
        input_dir: input_dir.to_path_buf(),
        profile: EncodeProfile::resolve(&table, codec, None, Some(preset), max_height).unwrap(),
        jobs: 2,
        recursive: false,
        exclude: None,
        verify,
        overwrite: false,
        dry_run: false,
        show_progress: false,
    }
}

fn encoder() -> BatchEncoder {
    encoder_with_signal(Arc::new(AtomicBool::new(false)))
}

fn encoder_with_signal(shutdown_signal: Arc<AtomicBool>) -> BatchEncoder {
    let config = Config {
        codec_table: CodecTable::embedded().unwrap(),
        settings: UserSettings::default(),
    };
    BatchEncoder::new(config, shutdown_signal)
}

#[test]
fn test_hevc_batch_encode_e2e() {
    if !ffmpeg_ready() || !encoder_available("libx265") {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    generate_clip(&root.join("first.mp4"), 2, 360);
    generate_clip(&root.join("second.mkv"), 2, 360);

    let report = encoder()
        .run(&request(root, Codec::Hevc, Some(240), VerifyMode::Both))
        .unwrap();
    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 0);
    assert!(report.output_bytes > 0);

    let output_dir = root.join("hevc_output");
    let output = output_dir.join("first_hevc.mp4");
    let info = get_video_info(&output).unwrap();
    assert_eq!(info.height, Some(240));
    assert!((info.duration_seconds.unwrap() - 2.0).abs() < 0.5);

    // 不應留下暫存檔
    let leftovers = fs::read_dir(&output_dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains(".part."))
        .count();
    assert_eq!(leftovers, 0);

    // 第二次執行全部略過
    let report = encoder()
        .run(&request(root, Codec::Hevc, Some(240), VerifyMode::Off))
        .unwrap();
    assert_eq!(report.skipped, 2);
    assert_eq!(report.completed, 0);
}

#[test]
fn test_av1_batch_encode_e2e() {
    if !ffmpeg_ready() || !encoder_available("libsvtav1") {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    generate_clip(&root.join("clip.mp4"), 1, 240);

    let report = encoder()
        .run(&request(root, Codec::Av1, None, VerifyMode::Duration))
        .unwrap();
    assert_eq!(report.completed, 1);
    assert!(root.join("av1_output").join("clip_av1.mkv").exists());
}

#[test]
fn test_broken_input_is_logged_e2e() {
    if !ffmpeg_ready() || !encoder_available("libx265") {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("broken.mp4"), b"this is not a video").unwrap();

    let report = encoder()
        .run(&request(root, Codec::Hevc, None, VerifyMode::Off))
        .unwrap();
    assert_eq!(report.failed, 1);

    let log = fs::read_to_string(root.join("hevc_summary.log")).unwrap();
    assert!(log.starts_with("broken.mp4 => [ERROR]:"));
    assert!(log.lines().skip(1).all(|line| line.starts_with("//")));

    let output_dir = root.join("hevc_output");
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 0);
}

#[test]
fn test_interrupt_mid_encode_e2e() {
    if !ffmpeg_ready() || !encoder_available("libx265") {
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    generate_clip(&root.join("long.mp4"), 60, 720);

    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let trigger = Arc::clone(&shutdown_signal);
    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(800));
        trigger.store(true, Ordering::SeqCst);
    });

    let mut request = request(root, Codec::Hevc, None, VerifyMode::Off);
    request.profile.preset = "slow".to_string();
    let report = encoder_with_signal(shutdown_signal).run(&request).unwrap();
    interrupter.join().unwrap();

    assert_eq!(report.cancelled, 1);
    assert_eq!(report.completed, 0);
    assert!(!root.join("hevc_summary.log").exists());

    // 中斷後不應留下暫存檔或正式輸出
    let output_dir = root.join("hevc_output");
    assert_eq!(fs::read_dir(&output_dir).unwrap().count(), 0);
}
