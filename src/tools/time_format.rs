/// 將秒數轉為 mm:ss，分鐘不設上限
#[must_use]
pub fn format_mmss(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[must_use]
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// 帶正負號、一位小數的百分比，例如 `-42.5%`
#[must_use]
pub fn format_signed_percent(value: f64) -> String {
    let sign = if value >= 0.0 { '+' } else { '-' };
    format!("{sign}{:.1}%", value.abs())
}
