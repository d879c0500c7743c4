const KIB: f32 = 1024.0;
const MIB: f32 = KIB * 1024.0;

/// Render a human-friendly transfer speed string.
#[must_use]
pub fn format_speed(bytes_per_sec: f32) -> String {
    format!("{}/s", format_size_f32(bytes_per_sec))
}

/// Render a byte count.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    format_size_f32(bytes as f32)
}

fn format_size_f32(bytes: f32) -> String {
    if bytes < KIB {
        format!("{bytes:.0} B")
    } else if bytes < MIB {
        format!("{:.1} KB", bytes / KIB)
    } else {
        format!("{:.1} MB", bytes / MIB)
    }
}

/// Compute download progress as a percentage.
#[must_use]
pub fn progress_percent(downloaded: u64, total: Option<u64>) -> f32 {
    match total {
        Some(total) if total > 0 => (downloaded as f32 / total as f32) * 100.0,
        _ => 0.0,
    }
}
