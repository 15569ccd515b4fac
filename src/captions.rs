use regex::Regex;
use tracing::debug;

use crate::transcript::TranscriptSegment;

/// Timing line of a cue block: `HH:MM:SS.mmm --> HH:MM:SS.mmm`, optionally
/// followed by cue settings which are ignored.
const TIMING_PATTERN: &str =
    r"(\d{2}):(\d{2}):(\d{2}\.\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2}\.\d{3})";

/// Inline markup tags (`<i>`, `<c.color>`, voice spans, timestamps)
const MARKUP_PATTERN: &str = r"<[^>]+>";

/// Parse a WebVTT subtitle document into timed transcript segments.
///
/// Cue blocks are separated by blank lines; a block is a timing line
/// (optionally preceded by a cue identifier) followed by one or more text
/// lines. Blocks with unparsable timing are skipped, as are blocks whose
/// text is empty after markup stripping. Block order is preserved.
pub fn parse_vtt(document: &str) -> Vec<TranscriptSegment> {
    let mut segments = Vec::new();
    let Ok(timing) = Regex::new(TIMING_PATTERN) else {
        return segments;
    };
    let Ok(markup) = Regex::new(MARKUP_PATTERN) else {
        return segments;
    };

    let document = document.replace('\r', "");
    for block in document.split("\n\n") {
        let mut lines = block.lines();

        // Scan past header/identifier lines for the timing line
        let Some(timing_line) = lines.by_ref().find(|line| line.contains("-->")) else {
            continue;
        };
        let Some((start, end)) = parse_timing(&timing, timing_line) else {
            debug!("Skipping cue block with malformed timing: {}", timing_line);
            continue;
        };

        let text = lines.collect::<Vec<_>>().join(" ");
        let text = markup.replace_all(&text, "");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            debug!("Skipping cue block with empty text at {}s", start);
            continue;
        }

        segments.push(TranscriptSegment::new(start, end, text));
    }

    segments
}

/// Extract `(start, end)` seconds from a cue timing line
fn parse_timing(timing: &Regex, line: &str) -> Option<(f64, f64)> {
    let caps = timing.captures(line)?;
    let start = cue_seconds(&caps[1], &caps[2], &caps[3])?;
    let end = cue_seconds(&caps[4], &caps[5], &caps[6])?;
    Some((start, end))
}

/// `H*3600 + M*60 + S.mmm`
fn cue_seconds(hours: &str, minutes: &str, seconds: &str) -> Option<f64> {
    let hours: f64 = hours.parse().ok()?;
    let minutes: f64 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHello <i>world</i>\n\n00:00:03.500 --> 00:00:05.250\nSecond cue\nspans two lines\n";

    #[test]
    fn test_parse_basic_block() {
        let segments = parse_vtt("00:00:01.000 --> 00:00:02.000\nHello <i>world</i>");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 1.0);
        assert_eq!(segments[0].end, 2.0);
        assert_eq!(segments[0].text, "Hello world");
    }

    #[test]
    fn test_parse_preserves_order_and_collapses_lines() {
        let segments = parse_vtt(SAMPLE);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world");
        assert_eq!(segments[1].start, 3.5);
        assert_eq!(segments[1].end, 5.25);
        assert_eq!(segments[1].text, "Second cue spans two lines");
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_vtt(SAMPLE), parse_vtt(SAMPLE));
    }

    #[test]
    fn test_hour_arithmetic() {
        let segments = parse_vtt("01:02:03.500 --> 01:02:04.000\ntext");
        assert_eq!(segments[0].start, 3723.5);
    }

    #[test]
    fn test_empty_after_stripping_is_dropped() {
        let doc = "00:00:01.000 --> 00:00:02.000\n<c.colorE5E5E5></c>\n\n00:00:03.000 --> 00:00:04.000\nkept";
        let segments = parse_vtt(doc);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "kept");
    }

    #[test]
    fn test_malformed_timing_is_skipped() {
        let doc = "bad --> timing\nlost text\n\n00:00:03.000 --> 00:00:04.000\nkept";
        let segments = parse_vtt(doc);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 3.0);
    }

    #[test]
    fn test_cue_identifier_and_settings_ignored() {
        let doc = "cue-7\n00:00:01.000 --> 00:00:02.000 align:start position:0%\ntext body";
        let segments = parse_vtt(doc);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "text body");
    }

    #[test]
    fn test_crlf_documents() {
        let doc = "00:00:01.000 --> 00:00:02.000\r\nwindows\r\nline endings\r\n";
        let segments = parse_vtt(doc);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "windows line endings");
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_vtt("").is_empty());
        assert!(parse_vtt("WEBVTT\n\nNOTE nothing here\n").is_empty());
    }
}
