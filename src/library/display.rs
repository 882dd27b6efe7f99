use super::model::AudioEntry;

/// Format seconds as `mm:ss`; minutes keep counting past the hour.
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Case-insensitive substring match against file name or description.
/// An empty query matches everything.
pub fn matches_query(entry: &AudioEntry, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    entry.file_name().to_lowercase().contains(&query)
        || entry.description().to_lowercase().contains(&query)
}

/// Index results carry no order; sort by file name for display.
pub fn sort_by_file_name(entries: &mut [AudioEntry]) {
    entries.sort_by_cached_key(|e| (e.file_name().to_lowercase(), e.path().to_path_buf()));
}
