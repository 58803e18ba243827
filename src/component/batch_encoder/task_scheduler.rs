use super::cpu_gate::CpuGate;
use super::ffmpeg_command::FfmpegCommand;
use super::job::{EncodingJob, JobStatus};
use super::progress::{EncodeProgress, ProgressEvent};
use super::summary_log::SummaryLog;
use super::verifier::verify_output;
use crate::config::{CodecSpec, EncodeProfile, VerifyMode};
use crate::tools::ensure_directory_exists;
use anyhow::{Context, Result, anyhow};
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, info, warn};
use rust_i18n::t;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStderr, ChildStdout, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const STDERR_TAIL_LINES: usize = 20;

const BAR_TEMPLATE: &str = "{prefix:.bold} [{bar:30.cyan/blue}] {msg}";
const SPINNER_TEMPLATE: &str = "{prefix:.bold} {spinner:.green} {msg}";
const OVERALL_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{pos}/{len}] {msg}";

#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    pub max_parallel: usize,
    pub cpu_threshold: f32,
    pub verify: VerifyMode,
    pub show_progress: bool,
}

struct RunningEncode {
    child: Child,
    job_index: usize,
    progress: Arc<Mutex<EncodeProgress>>,
    stderr_tail: Arc<Mutex<VecDeque<String>>>,
    readers: Vec<JoinHandle<()>>,
    bar: ProgressBar,
    started: Instant,
}

impl RunningEncode {
    fn join_readers(&mut self) {
        for handle in self.readers.drain(..) {
            if handle.join().is_err() {
                warn!("Output reader thread for job {} panicked", self.job_index);
            }
        }
    }

    fn stderr_lines(&self) -> Vec<String> {
        self.stderr_tail
            .lock()
            .map(|tail| tail.iter().cloned().collect())
            .unwrap_or_default()
    }
}

pub struct TaskScheduler {
    jobs: Vec<EncodingJob>,
    running: HashMap<u32, RunningEncode>,
    profile: EncodeProfile,
    spec: CodecSpec,
    options: SchedulerOptions,
    cpu_gate: CpuGate,
    summary_log: SummaryLog,
    shutdown_signal: Arc<AtomicBool>,
    multi_progress: MultiProgress,
    overall: ProgressBar,
    bar_style: ProgressStyle,
    spinner_style: ProgressStyle,
    started_count: usize,
    queued_count: usize,
}

impl TaskScheduler {
    pub fn new(
        jobs: Vec<EncodingJob>,
        profile: EncodeProfile,
        spec: CodecSpec,
        options: SchedulerOptions,
        summary_log: SummaryLog,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self> {
        let multi_progress = if options.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let queued_count = jobs
            .iter()
            .filter(|j| j.status == JobStatus::Pending)
            .count();

        let overall = multi_progress.add(ProgressBar::new(queued_count as u64));
        overall.set_style(
            ProgressStyle::with_template(OVERALL_TEMPLATE)
                .context("Unable to create overall progress style")?,
        );

        Ok(Self {
            jobs,
            running: HashMap::new(),
            profile,
            spec,
            options,
            cpu_gate: CpuGate::new(options.cpu_threshold),
            summary_log,
            shutdown_signal,
            multi_progress,
            overall,
            bar_style: ProgressStyle::with_template(BAR_TEMPLATE)
                .context("Unable to create encode progress style")?
                .progress_chars("#>-"),
            spinner_style: ProgressStyle::with_template(SPINNER_TEMPLATE)
                .context("Unable to create encode spinner style")?,
            started_count: 0,
            queued_count,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        info!(
            "Starting {} encoding jobs ({} skipped, up to {} at a time)",
            self.queued_count,
            self.jobs.len() - self.queued_count,
            self.options.max_parallel
        );

        if self.queued_count > 0 {
            self.overall.enable_steady_tick(Duration::from_millis(200));
        }

        while !self.is_all_finished() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                self.handle_shutdown();
                break;
            }

            self.check_completed_processes()?;
            self.spawn_new_tasks_if_possible()?;
            self.refresh_progress();

            thread::sleep(POLL_INTERVAL);
        }

        self.overall.finish_and_clear();
        info!("Encoding loop finished");
        Ok(())
    }

    fn is_all_finished(&self) -> bool {
        self.jobs.iter().all(|j| j.status.is_finished()) && self.running.is_empty()
    }

    fn spawn_new_tasks_if_possible(&mut self) -> Result<()> {
        while self
            .cpu_gate
            .allows_new_job(self.running.len(), self.options.max_parallel)
        {
            let Some(job_index) = self.find_next_pending_job() else {
                break;
            };
            self.spawn_task(job_index)?;
        }
        Ok(())
    }

    fn find_next_pending_job(&self) -> Option<usize> {
        self.jobs
            .iter()
            .position(|j| j.status == JobStatus::Pending)
    }

    fn spawn_task(&mut self, job_index: usize) -> Result<()> {
        self.started_count += 1;
        let job = &mut self.jobs[job_index];

        if let Some(parent) = job.destination_path.parent() {
            ensure_directory_exists(parent)?;
        }

        let ffmpeg_cmd = FfmpegCommand::new(job, &self.profile, &self.spec);
        debug!("Running: {}", ffmpeg_cmd.display());

        let mut command = ffmpeg_cmd.build_command();
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        match command.spawn() {
            Ok(mut child) => {
                let pid = child.id();
                job.status = JobStatus::Running;

                info!(
                    "Started encode [{}]: {} -> {}",
                    pid,
                    job.source_path.display(),
                    job.destination_path.display()
                );

                let bar = match job.duration_seconds {
                    Some(seconds) => ProgressBar::new((seconds * 1000.0).round() as u64)
                        .with_style(self.bar_style.clone()),
                    None => ProgressBar::new_spinner().with_style(self.spinner_style.clone()),
                };
                bar.set_prefix(format!(
                    "[{}/{}] {}",
                    self.started_count,
                    self.queued_count,
                    job.file_name()
                ));
                let bar = self.multi_progress.insert_before(&self.overall, bar);

                let progress = Arc::new(Mutex::new(EncodeProgress::new()));
                let stderr_tail = Arc::new(Mutex::new(VecDeque::new()));
                let mut readers = Vec::with_capacity(2);
                if let Some(handle) =
                    Self::spawn_progress_reader(child.stdout.take(), Arc::clone(&progress))
                {
                    readers.push(handle);
                }
                if let Some(handle) =
                    Self::spawn_stderr_reader(child.stderr.take(), Arc::clone(&stderr_tail))
                {
                    readers.push(handle);
                }

                self.running.insert(
                    pid,
                    RunningEncode {
                        child,
                        job_index,
                        progress,
                        stderr_tail,
                        readers,
                        bar,
                        started: Instant::now(),
                    },
                );
            }
            Err(e) => {
                error!("Failed to start ffmpeg for {}: {e}", job.source_path.display());
                self.fail_job(job_index, vec![format!("Failed to start ffmpeg: {e}")]);
                self.overall.inc(1);
            }
        }

        Ok(())
    }

    /// 從 ffmpeg 標準輸出讀取進度資訊
    fn spawn_progress_reader(
        stdout: Option<ChildStdout>,
        progress: Arc<Mutex<EncodeProgress>>,
    ) -> Option<JoinHandle<()>> {
        let reader = BufReader::new(stdout?);
        Some(thread::spawn(move || {
            for line in reader.lines().map_while(Result::ok) {
                let Ok(mut state) = progress.lock() else {
                    break;
                };
                if state.apply_line(&line) == ProgressEvent::End {
                    break;
                }
            }
        }))
    }

    /// 持續讀取標準錯誤，避免管線塞滿，只保留最後幾行
    fn spawn_stderr_reader(
        stderr: Option<ChildStderr>,
        tail: Arc<Mutex<VecDeque<String>>>,
    ) -> Option<JoinHandle<()>> {
        let reader = BufReader::new(stderr?);
        Some(thread::spawn(move || {
            for line in reader.lines().map_while(Result::ok) {
                let line = line.trim_end().to_string();
                if line.is_empty() {
                    continue;
                }
                if let Ok(mut tail) = tail.lock() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
        }))
    }

    fn check_completed_processes(&mut self) -> Result<()> {
        let mut completed = Vec::new();

        for (pid, process) in &mut self.running {
            match process.child.try_wait() {
                Ok(Some(status)) => completed.push((*pid, Some(status))),
                Ok(None) => {}
                Err(e) => {
                    warn!("Unable to check ffmpeg process [{pid}]: {e}");
                    let _ = process.child.kill();
                    let _ = process.child.wait();
                    completed.push((*pid, None));
                }
            }
        }

        for (pid, status) in completed {
            if let Some(process) = self.running.remove(&pid) {
                self.finish_process(pid, process, status)?;
            }
        }

        Ok(())
    }

    fn finish_process(
        &mut self,
        pid: u32,
        mut process: RunningEncode,
        status: Option<ExitStatus>,
    ) -> Result<()> {
        process.join_readers();
        process.bar.finish_and_clear();
        self.multi_progress.remove(&process.bar);

        let job_index = process.job_index;
        self.jobs[job_index].elapsed = Some(process.started.elapsed());

        let outcome = match status {
            Some(status) if status.success() => self.finalize_success(job_index),
            Some(status) => {
                let mut lines = vec![format!("ffmpeg exited with {status}")];
                lines.extend(process.stderr_lines());
                Err(anyhow!(lines.join("\n")))
            }
            None => Err(anyhow!("Lost track of the ffmpeg process")),
        };

        match outcome {
            Ok(()) => {
                let job = &mut self.jobs[job_index];
                job.status = JobStatus::Completed;
                info!("Encode finished [{}]: {}", pid, job.destination_path.display());

                let file_name = job.file_name();
                if let Err(e) = self.summary_log.record_success(&file_name) {
                    warn!("{e:#}");
                }
                let seconds = job.elapsed.map_or(0.0, |d| d.as_secs_f64());
                self.announce(format!(
                    "{} {} ({seconds:.1}s)",
                    style(t!("encoder.job_ok")).green().bold(),
                    file_name
                ));
            }
            Err(e) => {
                let lines: Vec<String> = format!("{e:#}").lines().map(str::to_string).collect();
                error!(
                    "Encode failed [{}]: {}: {}",
                    pid,
                    self.jobs[job_index].source_path.display(),
                    lines.join(" | ")
                );
                self.fail_job(job_index, lines);
            }
        }

        self.overall.inc(1);
        Ok(())
    }

    /// 驗證暫存檔後改為正式檔名
    fn finalize_success(&mut self, job_index: usize) -> Result<()> {
        let job = &self.jobs[job_index];
        verify_output(self.options.verify, job.duration_seconds, &job.temp_path)?;

        fs::rename(&job.temp_path, &job.destination_path).with_context(|| {
            format!(
                "Failed to move {} to {}",
                job.temp_path.display(),
                job.destination_path.display()
            )
        })?;

        let output_size = fs::metadata(&job.destination_path).map(|m| m.len()).ok();
        self.jobs[job_index].output_size = output_size;
        Ok(())
    }

    fn fail_job(&mut self, job_index: usize, error_lines: Vec<String>) {
        let job = &mut self.jobs[job_index];

        if job.temp_path.exists() {
            match fs::remove_file(&job.temp_path) {
                Ok(()) => info!("Removed partial output {}", job.temp_path.display()),
                Err(e) => error!(
                    "Failed to remove partial output {}: {e}",
                    job.temp_path.display()
                ),
            }
        }

        job.status = JobStatus::Failed;
        job.error_lines = error_lines;

        let file_name = job.file_name();
        if let Err(e) = self.summary_log.record_failure(&file_name, &job.error_lines) {
            warn!("{e:#}");
        }
        self.announce(format!(
            "{} {}",
            style(t!("encoder.job_failed")).red().bold(),
            file_name
        ));
    }

    fn handle_shutdown(&mut self) {
        warn!(
            "Interrupt received, stopping {} running encodes",
            self.running.len()
        );

        for (pid, mut process) in self.running.drain() {
            warn!("Killing ffmpeg [{pid}]");
            let _ = process.child.kill();
            let _ = process.child.wait();
            process.join_readers();
            process.bar.finish_and_clear();

            let job = &mut self.jobs[process.job_index];
            job.status = JobStatus::Cancelled;
            if job.temp_path.exists() {
                if let Err(e) = fs::remove_file(&job.temp_path) {
                    error!(
                        "Failed to remove interrupted output {}: {e}",
                        job.temp_path.display()
                    );
                } else {
                    info!("Removed interrupted output {}", job.temp_path.display());
                }
            }
        }

        for job in &mut self.jobs {
            if job.status == JobStatus::Pending {
                job.status = JobStatus::Cancelled;
            }
        }

        self.announce(style(t!("encoder.interrupted")).yellow().to_string());
    }

    fn refresh_progress(&self) {
        for process in self.running.values() {
            let Ok(state) = process.progress.lock() else {
                continue;
            };
            let job = &self.jobs[process.job_index];

            if let Some(length) = process.bar.length().filter(|_| job.duration_seconds.is_some()) {
                let position = if state.finished {
                    length
                } else {
                    state.elapsed_ms().min(length)
                };
                process.bar.set_position(position);
            } else {
                process.bar.tick();
            }
            process.bar.set_message(state.status_line(job.duration_seconds));
        }

        let running = self.running.len();
        let failed = self
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Failed)
            .count();
        self.overall
            .set_message(t!("encoder.overall_status", running = running, failed = failed).to_string());
    }

    fn announce(&self, line: String) {
        self.multi_progress.suspend(|| println!("{line}"));
    }

    #[must_use]
    pub fn jobs(&self) -> &[EncodingJob] {
        &self.jobs
    }
}
