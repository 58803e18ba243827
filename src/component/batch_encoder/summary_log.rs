use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `<codec>_summary.log`，以附加方式寫入
pub struct SummaryLog {
    path: PathBuf,
    log_successes: bool,
}

impl SummaryLog {
    #[must_use]
    pub fn new(path: &Path, log_successes: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            log_successes,
        }
    }

    pub fn record_success(&self, file_name: &str) -> Result<()> {
        if !self.log_successes {
            return Ok(());
        }
        self.append(&format_success(file_name))
    }

    pub fn record_failure(&self, file_name: &str, error_lines: &[String]) -> Result<()> {
        self.append(&format_failure(file_name, error_lines))
    }

    fn append(&self, entry: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open summary log {}", self.path.display()))?;
        file.write_all(entry.as_bytes())
            .with_context(|| format!("Failed to write summary log {}", self.path.display()))
    }
}

#[must_use]
pub fn format_success(file_name: &str) -> String {
    format!("{file_name} => [OK]\n")
}

#[must_use]
pub fn format_failure(file_name: &str, error_lines: &[String]) -> String {
    let mut entry = format!("{file_name} => [ERROR]:\n");
    for line in error_lines.iter().flat_map(|l| l.lines()) {
        entry.push_str("//");
        entry.push_str(line);
        entry.push('\n');
    }
    entry
}
