use crate::config::Codec;
use crate::tools::{VideoInfo, get_video_info};
use anyhow::Result;
use log::{debug, warn};
use rayon::prelude::*;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct VideoFileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub info: Option<VideoInfo>,
}

impl VideoFileInfo {
    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        self.info.as_ref().and_then(|i| i.duration_seconds)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// 小寫、含前導點
    pub extensions: Vec<String>,
    pub recursive: bool,
    pub exclude: Option<Regex>,
}

impl ScanOptions {
    fn is_video_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let ext = format!(".{}", ext.to_lowercase());
                self.extensions.iter().any(|e| *e == ext)
            })
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|re| re.is_match(&entry.file_name().to_string_lossy()))
    }
}

/// 編碼輸出資料夾不可再被當作來源
fn is_output_directory(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && Codec::ALL
            .iter()
            .any(|codec| entry.file_name().to_string_lossy() == format!("{codec}_output"))
}

/// 只列出符合條件的影片路徑，依路徑排序，不呼叫 ffprobe
pub fn collect_video_paths(directory: &Path, options: &ScanOptions) -> Result<Vec<(PathBuf, u64)>> {
    let max_depth = if options.recursive { usize::MAX } else { 1 };

    let mut files: Vec<(PathBuf, u64)> = WalkDir::new(directory)
        .follow_links(false)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| !is_output_directory(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| options.is_video_file(entry.path()))
        .filter(|entry| !options.is_excluded(entry))
        .filter_map(|entry| {
            let size = entry.metadata().ok()?.len();
            Some((entry.into_path(), size))
        })
        .collect();

    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// 掃描並平行取得每個影片的 ffprobe 資訊
pub fn scan_video_files(directory: &Path, options: &ScanOptions) -> Result<Vec<VideoFileInfo>> {
    let paths = collect_video_paths(directory, options)?;

    Ok(paths
        .into_par_iter()
        .map(|(path, size)| {
            let info = match get_video_info(&path) {
                Ok(info) => Some(info),
                Err(e) => {
                    debug!("Probe failed for {}: {e:#}", path.display());
                    None
                }
            };
            VideoFileInfo { path, size, info }
        })
        .collect())
}
