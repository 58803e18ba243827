//! 批次影片編碼元件
//!
//! 以 ffmpeg 將資料夾內的影片依選定的編碼設定（HEVC/AV1、CRF、preset、
//! 縮放）逐一轉檔，並即時顯示進度

mod cpu_gate;
mod ffmpeg_command;
mod job;
mod main;
mod progress;
mod report;
mod summary_log;
mod task_scheduler;
mod verifier;

pub use cpu_gate::CpuGate;
pub use ffmpeg_command::{
    FPS_CAP_THRESHOLD, FfmpegCommand, OUTPUT_FPS_CAP, output_frame_rate, scale_filter,
};
pub use job::{EncodingJob, JobStatus, OutputLayout, plan_jobs};
pub use main::{BatchEncoder, EncodeRequest};
pub use progress::{EncodeProgress, ProgressEvent};
pub use report::BatchReport;
pub use summary_log::{SummaryLog, format_failure, format_success};
pub use task_scheduler::{SchedulerOptions, TaskScheduler};
pub use verifier::{DURATION_MARGIN_SECONDS, check_decode, check_duration, verify_output};
