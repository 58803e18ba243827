use super::job::{EncodingJob, JobStatus};
use crate::tools::{bytes_to_mb, format_signed_percent};
use console::style;
use rust_i18n::t;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
    /// 僅計算成功編碼的檔案
    pub source_bytes: u64,
    pub output_bytes: u64,
    pub failed_files: Vec<PathBuf>,
}

impl BatchReport {
    #[must_use]
    pub fn from_jobs(jobs: &[EncodingJob]) -> Self {
        let mut report = Self {
            total: jobs.len(),
            ..Self::default()
        };

        for job in jobs {
            match job.status {
                JobStatus::Completed => {
                    report.completed += 1;
                    report.source_bytes += job.source_size;
                    report.output_bytes += job.output_size.unwrap_or(0);
                }
                JobStatus::Skipped => report.skipped += 1,
                JobStatus::Failed => {
                    report.failed += 1;
                    report.failed_files.push(job.source_path.clone());
                }
                JobStatus::Cancelled | JobStatus::Pending | JobStatus::Running => {
                    report.cancelled += 1;
                }
            }
        }

        report
    }

    /// 輸出相對於原始檔的大小變化（%），沒有成功的檔案時為 None
    #[must_use]
    pub fn size_change_percent(&self) -> Option<f64> {
        (self.source_bytes > 0).then(|| {
            (self.output_bytes as f64 - self.source_bytes as f64) / self.source_bytes as f64
                * 100.0
        })
    }

    pub fn print(&self) {
        println!();
        println!("{}", style(t!("report.title")).cyan().bold());
        println!("  {}", t!("report.total", count = self.total));
        println!(
            "  {}",
            style(t!("report.completed", count = self.completed)).green()
        );
        if self.skipped > 0 {
            println!(
                "  {}",
                style(t!("report.skipped", count = self.skipped)).yellow()
            );
        }
        if self.failed > 0 {
            println!("  {}", style(t!("report.failed", count = self.failed)).red());
            for path in &self.failed_files {
                println!("    - {}", path.display());
            }
        }
        if self.cancelled > 0 {
            println!(
                "  {}",
                style(t!("report.cancelled", count = self.cancelled)).yellow()
            );
        }

        if let Some(change) = self.size_change_percent() {
            let source_mb = format!("{:.1}", bytes_to_mb(self.source_bytes));
            let output_mb = format!("{:.1}", bytes_to_mb(self.output_bytes));
            let change = format_signed_percent(change);
            println!(
                "  {}",
                t!(
                    "report.size",
                    source = source_mb,
                    output = output_mb,
                    change = change
                )
            );
        }
    }
}
