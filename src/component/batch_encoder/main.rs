use super::ffmpeg_command::FfmpegCommand;
use super::job::{EncodingJob, JobStatus, OutputLayout, plan_jobs};
use super::report::BatchReport;
use super::summary_log::SummaryLog;
use super::task_scheduler::{SchedulerOptions, TaskScheduler};
use crate::config::{Config, EncodeProfile, VerifyMode};
use crate::tools::{
    ScanOptions, bytes_to_mb, ensure_directory_exists, require_binaries, scan_video_files,
    validate_directory_exists,
};
use anyhow::{Context, Result};
use console::style;
use log::{error, info};
use regex::Regex;
use rust_i18n::t;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 一次批次編碼的完整參數（已合併 CLI 與設定檔）
#[derive(Debug, Clone)]
pub struct EncodeRequest {
    pub input_dir: PathBuf,
    pub profile: EncodeProfile,
    pub jobs: usize,
    pub recursive: bool,
    pub exclude: Option<Regex>,
    pub verify: VerifyMode,
    pub overwrite: bool,
    pub dry_run: bool,
    pub show_progress: bool,
}

pub struct BatchEncoder {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl BatchEncoder {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&self, request: &EncodeRequest) -> Result<BatchReport> {
        let codec = request.profile.codec;
        println!(
            "{}",
            style(t!("encoder.title", codec = codec)).cyan().bold()
        );

        validate_directory_exists(&request.input_dir)?;
        if !request.dry_run {
            require_binaries()?;
        }

        let spec = self.config.codec_table.spec(codec)?.clone();
        println!(
            "{}",
            style(t!(
                "encoder.profile",
                encoder = &spec.encoder,
                crf = request.profile.crf,
                preset = &request.profile.preset
            ))
            .dim()
        );
        if let Some(height) = request.profile.max_height {
            println!(
                "{}",
                style(t!("encoder.downscale", height = height)).dim()
            );
        }

        println!("{}", style(t!("encoder.scanning")).dim());
        let scan_options = ScanOptions {
            extensions: self.config.settings.normalized_extensions(),
            recursive: request.recursive,
            exclude: request.exclude.clone(),
        };
        let video_files = scan_video_files(&request.input_dir, &scan_options)?;

        if video_files.is_empty() {
            println!("{}", style(t!("encoder.no_videos")).yellow());
            return Ok(BatchReport::default());
        }

        let layout = OutputLayout::new(&request.input_dir, codec, &spec);
        let jobs = plan_jobs(&video_files, &layout, request.overwrite);
        Self::print_plan(&jobs);

        if request.dry_run {
            for job in jobs.iter().filter(|j| j.status == JobStatus::Pending) {
                println!(
                    "{}",
                    FfmpegCommand::new(job, &request.profile, &spec).display()
                );
            }
            return Ok(BatchReport::from_jobs(&jobs));
        }

        ensure_directory_exists(&layout.output_directory)?;
        let summary_log = SummaryLog::new(&layout.summary_log, self.config.settings.log_successes);

        println!();
        println!("{}", style(t!("encoder.starting")).cyan());

        let mut scheduler = TaskScheduler::new(
            jobs,
            request.profile.clone(),
            spec,
            SchedulerOptions {
                max_parallel: request.jobs.max(1),
                cpu_threshold: self.config.settings.cpu_threshold,
                verify: request.verify,
                show_progress: request.show_progress,
            },
            summary_log,
            Arc::clone(&self.shutdown_signal),
        )
        .context("Unable to prepare encoding jobs")?;

        if let Err(e) = scheduler.run() {
            error!("Encoding run failed: {e:#}");
            return Err(e);
        }

        let report = BatchReport::from_jobs(scheduler.jobs());
        report.print();
        if report.failed > 0 {
            println!(
                "{}",
                style(t!(
                    "encoder.see_summary_log",
                    path = layout.summary_log.display()
                ))
                .yellow()
            );
        }

        info!(
            "Batch finished - completed: {}, skipped: {}, failed: {}, cancelled: {}",
            report.completed, report.skipped, report.failed, report.cancelled
        );

        Ok(report)
    }

    fn print_plan(jobs: &[EncodingJob]) {
        println!(
            "{}",
            style(t!("encoder.found_videos", count = jobs.len())).green()
        );

        for (index, job) in jobs.iter().enumerate() {
            let size_mb = bytes_to_mb(job.source_size);
            let line = format!("  {}. {} ({:.2} MB)", index + 1, job.file_name(), size_mb);
            if job.status == JobStatus::Skipped {
                println!(
                    "{} {}",
                    line,
                    style(t!("encoder.job_skipped")).yellow()
                );
            } else {
                println!("{line}");
            }
        }
    }
}
