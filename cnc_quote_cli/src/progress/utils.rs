//! Formatting helpers shared by progress and output rendering

use std::time::Duration;

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Format a lead time given in hours, switching to working days past a day
pub fn format_lead_time(hours: u64) -> String {
    const WORKDAY: u64 = 8;
    if hours < WORKDAY {
        return format!("{hours} h");
    }
    let days = hours / WORKDAY;
    match hours % WORKDAY {
        0 => format!("{days} d"),
        rest => format!("{days} d {rest} h"),
    }
}

/// Format elapsed wall time for status lines
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    if seconds < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else {
        format!("{}m {}s", seconds / 60, seconds % 60)
    }
}
