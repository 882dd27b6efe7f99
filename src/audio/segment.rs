/// Playable length of `start..end` in a file of `total` seconds, or `None`
/// when `start` is at or past the end and there is nothing to play.
pub fn effective_length(start: f64, end: f64, total: f64) -> Option<f64> {
    if start >= total {
        return None;
    }
    Some((end - start).min(total - start).max(0.0))
}
