/// Format seconds as a display timestamp: `H:MM:SS` when an hour or more,
/// `MM:SS` otherwise. Negative input clamps to zero, fractional seconds are
/// truncated.
pub fn display_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

/// Build a time-coded deep link into the source video. Empty when no video
/// identifier is known.
pub fn watch_link(video_id: Option<&str>, seconds: f64) -> String {
    match video_id {
        Some(id) => format!("https://youtu.be/{}?t={}", id, seconds.max(0.0) as u64),
        None => String::new(),
    }
}
