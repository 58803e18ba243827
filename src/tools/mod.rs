mod binary_check;
mod ffprobe_info;
mod path_validator;
mod time_format;
mod video_scanner;

pub use binary_check::{
    FFMPEG, FFPROBE, binary_available, ffmpeg_available, ffprobe_available, require_binaries,
};
pub use ffprobe_info::{VideoInfo, get_video_info, parse_ffprobe_json, parse_frame_rate};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use time_format::{bytes_to_mb, format_mmss, format_signed_percent};
pub use video_scanner::{ScanOptions, VideoFileInfo, collect_video_paths, scan_video_files};
