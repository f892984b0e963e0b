//! Overlap-aware merge between an in-progress sentence buffer and an
//! incoming transcript slice from the next recognition window.
//!
//! The frame aggregator (C3) prepends a trailing-tail overlap to every
//! window so words straddling a window boundary aren't cut off, which
//! means consecutive STT outputs usually repeat a few trailing/leading
//! words verbatim. This module removes that repetition instead of
//! concatenating it.

const MAX_OVERLAP_WORDS: usize = 6;
const REPLACEMENT_MAX_EXTRA_CHARS: usize = 80;

/// One whitespace-delimited token paired with its normalized form: lowercased,
/// with every character that isn't alphanumeric or an apostrophe stripped.
/// Tokens that normalize to nothing (pure punctuation, e.g. `"..."`) are
/// dropped so that punctuation never counts as a word for overlap purposes.
fn tokenize(text: &str) -> Vec<(String, &str)> {
    text.split_whitespace()
        .filter_map(|tok| {
            let normalized: String = tok
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '\'')
                .flat_map(|c| c.to_lowercase())
                .collect();
            if normalized.is_empty() {
                None
            } else {
                Some((normalized, tok))
            }
        })
        .collect()
}

/// Normalized-word view of a string, for word-boundary-safe comparisons.
pub fn normalize(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .map(|(n, _)| n)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Merges `slice` into `buffer` per the overlap-aware rules: a refined
/// full-restatement replaces the buffer outright; otherwise the longest
/// 1-6 word overlap between the end of `buffer` and the start of `slice`
/// is stripped from `slice` before concatenating; with no overlap, the
/// two are joined with a single space.
pub fn merge(buffer: &str, slice: &str) -> String {
    let buffer_tokens = tokenize(buffer);
    let slice_tokens = tokenize(slice);
    let buffer_norm: Vec<&str> = buffer_tokens.iter().map(|(n, _)| n.as_str()).collect();
    let slice_norm: Vec<&str> = slice_tokens.iter().map(|(n, _)| n.as_str()).collect();

    if slice_norm.len() >= buffer_norm.len() && slice_norm[..buffer_norm.len()] == buffer_norm[..] {
        let buffer_normalized_len: usize = buffer_norm.iter().map(|w| w.len()).sum::<usize>() + buffer_norm.len();
        let slice_normalized_len: usize = slice_norm.iter().map(|w| w.len()).sum::<usize>() + slice_norm.len();
        let extra = slice_normalized_len.saturating_sub(buffer_normalized_len);
        if extra < REPLACEMENT_MAX_EXTRA_CHARS {
            return slice.trim().to_string();
        }
    }

    let max_k = MAX_OVERLAP_WORDS.min(buffer_norm.len()).min(slice_norm.len());
    let overlap_k = (1..=max_k)
        .rev()
        .find(|&k| buffer_norm[buffer_norm.len() - k..] == slice_norm[..k])
        .unwrap_or(0);

    let remainder: String = slice_tokens[overlap_k..]
        .iter()
        .map(|(_, orig)| *orig)
        .collect::<Vec<_>>()
        .join(" ");

    if remainder.is_empty() {
        return buffer.trim().to_string();
    }

    let trimmed_buffer = buffer.trim_end();
    if trimmed_buffer.is_empty() {
        remainder
    } else {
        format!("{trimmed_buffer} {remainder}")
    }
}
