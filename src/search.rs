use serde::Serialize;
use std::collections::HashSet;

use crate::transcript::TranscriptSegment;

/// Default number of context characters kept on each side of a match
pub const DEFAULT_CONTEXT_WINDOW: usize = 40;

/// One keyword occurrence inside a transcript segment
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Segment start in seconds
    pub start: f64,
    /// Segment end in seconds
    pub end: f64,
    /// Matched keyword, original casing
    pub keyword: String,
    /// Bounded text window around the match
    pub context: String,
    /// Full segment text
    pub text: String,
}

/// Search transcript segments for keyword occurrences with the default
/// context window.
pub fn search_transcript(
    segments: &[TranscriptSegment],
    keyword_spec: &str,
    case_sensitive: bool,
) -> Vec<SearchHit> {
    search_transcript_with_window(segments, keyword_spec, case_sensitive, DEFAULT_CONTEXT_WINDOW)
}

/// Search transcript segments for keyword occurrences.
///
/// `keyword_spec` is a comma-separated keyword list; entries are trimmed and
/// empty ones dropped. Only the first occurrence of each keyword within a
/// segment is recorded, and hits sharing `(start rounded to 2 decimals,
/// keyword)` collapse to the first one seen. Results come back in ascending
/// `start` order.
///
/// Matching and the context window operate on character positions, so the
/// window is a character count and multi-byte text slices cleanly.
pub fn search_transcript_with_window(
    segments: &[TranscriptSegment],
    keyword_spec: &str,
    case_sensitive: bool,
    context_window: usize,
) -> Vec<SearchHit> {
    let keywords: Vec<&str> = keyword_spec
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .collect();
    if segments.is_empty() || keywords.is_empty() {
        return Vec::new();
    }

    let needles: Vec<Vec<char>> = keywords
        .iter()
        .map(|keyword| fold_chars(keyword, case_sensitive))
        .collect();

    let mut seen: HashSet<(i64, &str)> = HashSet::new();
    let mut hits = Vec::new();

    for segment in segments {
        let original: Vec<char> = segment.text.chars().collect();
        let folded = if case_sensitive {
            original.clone()
        } else {
            fold_chars(&segment.text, false)
        };

        for (keyword, needle) in keywords.iter().zip(&needles) {
            let Some(pos) = find_chars(&folded, needle) else {
                continue;
            };
            if !seen.insert((centi_seconds(segment.start), *keyword)) {
                continue;
            }

            let from = pos.saturating_sub(context_window);
            let to = (pos + needle.len() + context_window).min(original.len());
            let context: String = original[from..to].iter().collect();

            hits.push(SearchHit {
                start: segment.start,
                end: segment.end,
                keyword: (*keyword).to_string(),
                context,
                text: segment.text.clone(),
            });
        }
    }

    // Stable sort: ties keep discovery order
    hits.sort_by(|a, b| a.start.total_cmp(&b.start));
    hits
}

/// Per-character simple lowercase so positions map 1:1 onto the original
fn fold_chars(text: &str, case_sensitive: bool) -> Vec<char> {
    text.chars()
        .map(|c| {
            if case_sensitive {
                c
            } else {
                c.to_lowercase().next().unwrap_or(c)
            }
        })
        .collect()
}

/// Leftmost occurrence of `needle` in `haystack`, by character position
fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Two-decimal bucket for dedup keys
fn centi_seconds(seconds: f64) -> i64 {
    (seconds * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, start + 5.0, text)
    }

    #[test]
    fn test_case_insensitive_match() {
        let segments = vec![segment(10.0, "Sauna time")];
        let hits = search_transcript(&segments, "sauna", false);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].keyword, "sauna");
        assert_eq!(hits[0].start, 10.0);
        assert_eq!(hits[0].text, "Sauna time");
    }

    #[test]
    fn test_case_sensitive_mismatch() {
        let segments = vec![segment(10.0, "Sauna time")];
        assert!(search_transcript(&segments, "sauna", true).is_empty());
        assert_eq!(search_transcript(&segments, "Sauna", true).len(), 1);
    }

    #[test]
    fn test_original_keyword_casing_kept() {
        let segments = vec![segment(10.0, "sauna time")];
        let hits = search_transcript(&segments, "SAUNA", false);
        assert_eq!(hits[0].keyword, "SAUNA");
    }

    #[test]
    fn test_duplicate_rounded_start_collapses() {
        let segments = vec![
            segment(10.001, "foo bar"),
            segment(10.004, "foo baz"),
        ];
        let hits = search_transcript(&segments, "foo", false);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "foo bar");
    }

    #[test]
    fn test_empty_keyword_spec() {
        let segments = vec![segment(10.0, "anything")];
        assert!(search_transcript(&segments, "", false).is_empty());
        assert!(search_transcript(&segments, " , ", false).is_empty());
        assert!(search_transcript(&[], "anything", false).is_empty());
    }

    #[test]
    fn test_multiple_keywords_per_segment() {
        let segments = vec![segment(10.0, "foo and bar together")];
        let hits = search_transcript(&segments, "foo, bar", false);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].keyword, "foo");
        assert_eq!(hits[1].keyword, "bar");
    }

    #[test]
    fn test_first_occurrence_only() {
        let segments = vec![segment(10.0, "echo echo echo")];
        let hits = search_transcript(&segments, "echo", false);

        assert_eq!(hits.len(), 1);
        // Context anchors on the first occurrence
        assert!(hits[0].context.starts_with("echo"));
    }

    #[test]
    fn test_results_sorted_by_start() {
        let segments = vec![
            segment(30.0, "late foo"),
            segment(10.0, "early bar"),
            segment(20.0, "middle foo"),
        ];
        let hits = search_transcript(&segments, "foo, bar", false);

        assert_eq!(hits.len(), 3);
        for pair in hits.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn test_context_window_bounds() {
        let text = format!("{}needle{}", "a".repeat(100), "b".repeat(100));
        let segments = vec![segment(0.0, &text)];
        let hits = search_transcript_with_window(&segments, "needle", false, 10);

        let expected = format!("{}needle{}", "a".repeat(10), "b".repeat(10));
        assert_eq!(hits[0].context, expected);
    }

    #[test]
    fn test_context_clamped_at_text_edges() {
        let segments = vec![segment(0.0, "needle tail")];
        let hits = search_transcript_with_window(&segments, "needle", false, 40);
        assert_eq!(hits[0].context, "needle tail");
    }

    #[test]
    fn test_multibyte_text_context() {
        let segments = vec![segment(5.0, "今日はサウナで整う予定です")];
        let hits = search_transcript_with_window(&segments, "整う", false, 3);

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].context, "ウナで整う予定で");
    }

    #[test]
    fn test_keyword_spec_whitespace_trimmed() {
        let segments = vec![segment(10.0, "foo and bar")];
        let hits = search_transcript(&segments, " foo ,  bar ", false);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].keyword, "foo");
    }
}
