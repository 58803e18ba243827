use crate::config::{Codec, CodecSpec};
use crate::tools::VideoFileInfo;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Skipped,
    Failed,
    Cancelled,
}

impl JobStatus {
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }
}

/// 輸出資料夾與摘要記錄檔的位置
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub base_directory: PathBuf,
    pub output_directory: PathBuf,
    pub summary_log: PathBuf,
    codec: Codec,
    extension: String,
}

impl OutputLayout {
    #[must_use]
    pub fn new(base_directory: &Path, codec: Codec, spec: &CodecSpec) -> Self {
        Self {
            base_directory: base_directory.to_path_buf(),
            output_directory: base_directory.join(format!("{codec}_output")),
            summary_log: base_directory.join(format!("{codec}_summary.log")),
            codec,
            extension: spec.extension.clone(),
        }
    }

    /// `<output>/<相對子目錄>/<stem>_<codec>.<ext>`
    #[must_use]
    pub fn destination_for(&self, source_path: &Path) -> PathBuf {
        let file_stem = source_path
            .file_stem()
            .map_or_else(|| "output".into(), |s| s.to_string_lossy());
        let relative_parent = source_path
            .parent()
            .and_then(|parent| parent.strip_prefix(&self.base_directory).ok())
            .unwrap_or_else(|| Path::new(""));

        self.output_directory.join(relative_parent).join(format!(
            "{file_stem}_{}.{}",
            self.codec, self.extension
        ))
    }

    /// 編碼中的暫存檔，成功後才改名為正式檔名
    #[must_use]
    pub fn temp_path_for(destination: &Path) -> PathBuf {
        let stem = destination
            .file_stem()
            .map_or_else(|| "output".into(), |s| s.to_string_lossy());
        let extension = destination
            .extension()
            .map_or_else(|| "mkv".into(), |s| s.to_string_lossy());
        let parent = destination.parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!(".{stem}.{}.part.{extension}", Uuid::new_v4().simple()))
    }
}

#[derive(Debug)]
pub struct EncodingJob {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub temp_path: PathBuf,
    pub source_size: u64,
    pub output_size: Option<u64>,
    pub duration_seconds: Option<f64>,
    pub source_height: Option<u32>,
    pub source_frame_rate: Option<f64>,
    pub status: JobStatus,
    pub error_lines: Vec<String>,
    pub elapsed: Option<Duration>,
}

impl EncodingJob {
    #[must_use]
    pub fn new(video: &VideoFileInfo, layout: &OutputLayout) -> Self {
        let destination_path = layout.destination_for(&video.path);
        let temp_path = OutputLayout::temp_path_for(&destination_path);
        let info = video.info.as_ref();

        Self {
            source_path: video.path.clone(),
            destination_path,
            temp_path,
            source_size: video.size,
            output_size: None,
            duration_seconds: video.duration_seconds(),
            source_height: info.and_then(|i| i.height),
            source_frame_rate: info.and_then(|i| i.frame_rate),
            status: JobStatus::Pending,
            error_lines: Vec::new(),
            elapsed: None,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map_or_else(|| "unknown".to_string(), |s| s.to_string_lossy().to_string())
    }
}

/// 建立所有工作；輸出檔已存在者標記為略過
#[must_use]
pub fn plan_jobs(videos: &[VideoFileInfo], layout: &OutputLayout, overwrite: bool) -> Vec<EncodingJob> {
    videos
        .iter()
        .map(|video| {
            let mut job = EncodingJob::new(video, layout);
            if !overwrite && job.destination_path.exists() {
                job.status = JobStatus::Skipped;
            }
            job
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecTable;
    use crate::tools::VideoInfo;
    use std::fs;
    use tempfile::TempDir;

    fn layout(base: &Path, codec: Codec) -> OutputLayout {
        let table = CodecTable::embedded().unwrap();
        OutputLayout::new(base, codec, table.spec(codec).unwrap())
    }

    fn video(path: PathBuf) -> VideoFileInfo {
        VideoFileInfo {
            path,
            size: 1000,
            info: Some(VideoInfo {
                duration_seconds: Some(12.5),
                width: Some(1920),
                height: Some(1080),
                frame_rate: Some(29.97),
            }),
        }
    }

    #[test]
    fn test_layout_paths() {
        let layout = layout(Path::new("/videos"), Codec::Av1);
        assert_eq!(layout.output_directory, Path::new("/videos/av1_output"));
        assert_eq!(layout.summary_log, Path::new("/videos/av1_summary.log"));
        assert_eq!(
            layout.destination_for(Path::new("/videos/holiday.clip.MOV")),
            Path::new("/videos/av1_output/holiday.clip_av1.mkv")
        );
    }

    #[test]
    fn test_hevc_destination_uses_mp4() {
        let layout = layout(Path::new("/videos"), Codec::Hevc);
        assert_eq!(
            layout.destination_for(Path::new("/videos/a.mkv")),
            Path::new("/videos/hevc_output/a_hevc.mp4")
        );
    }

    #[test]
    fn test_destination_keeps_relative_subdirectory() {
        let layout = layout(Path::new("/videos"), Codec::Hevc);
        assert_eq!(
            layout.destination_for(Path::new("/videos/2024/trip/a.mp4")),
            Path::new("/videos/hevc_output/2024/trip/a_hevc.mp4")
        );
    }

    #[test]
    fn test_temp_path_is_hidden_sibling_with_same_extension() {
        let destination = Path::new("/videos/hevc_output/a_hevc.mp4");
        let temp = OutputLayout::temp_path_for(destination);
        assert_eq!(temp.parent(), destination.parent());
        let name = temp.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(".a_hevc."));
        assert!(name.ends_with(".part.mp4"));
        assert_ne!(temp, OutputLayout::temp_path_for(destination));
    }

    #[test]
    fn test_plan_jobs_skips_existing_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let layout = layout(temp_dir.path(), Codec::Hevc);
        fs::create_dir_all(&layout.output_directory).unwrap();
        fs::write(layout.output_directory.join("done_hevc.mp4"), b"x").unwrap();

        let videos = vec![
            video(temp_dir.path().join("done.mp4")),
            video(temp_dir.path().join("todo.mp4")),
        ];

        let jobs = plan_jobs(&videos, &layout, false);
        assert_eq!(jobs[0].status, JobStatus::Skipped);
        assert_eq!(jobs[1].status, JobStatus::Pending);
        assert_eq!(jobs[1].duration_seconds, Some(12.5));
        assert_eq!(jobs[1].source_height, Some(1080));

        let jobs = plan_jobs(&videos, &layout, true);
        assert!(jobs.iter().all(|j| j.status == JobStatus::Pending));
    }

    #[test]
    fn test_job_status_finished() {
        assert!(!JobStatus::Pending.is_finished());
        assert!(!JobStatus::Running.is_finished());
        assert!(JobStatus::Completed.is_finished());
        assert!(JobStatus::Skipped.is_finished());
        assert!(JobStatus::Failed.is_finished());
        assert!(JobStatus::Cancelled.is_finished());
    }
}
