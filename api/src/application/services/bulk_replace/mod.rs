//! Text scanning behind bulk search-and-replace.
//!
//! Everything here is synchronous and works on UTF-8 byte offsets that always
//! sit on char boundaries. Conversion to the UTF-16 offsets the admin client
//! expects happens at the edges via [`utf16_offset`].

pub mod diff;
pub mod link_spans;
pub mod matcher;
pub mod resolver;

/// Upper bound on matches examined per document when listing occurrences.
pub const MAX_MATCHES_PER_DOCUMENT: usize = 1000;

/// Upper bound on matches walked while looking for the first one outside a link.
/// Hitting it means "no replaceable match", not an error.
pub const MAX_FIRST_MATCH_ATTEMPTS: usize = 100;

/// Characters of context kept around each listed occurrence.
pub const MATCH_CONTEXT_CHARS: usize = 30;

/// Characters of context kept around the replaced occurrence in previews.
pub const PREVIEW_CONTEXT_CHARS: usize = 50;

#[derive(Debug, Default, Clone)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub category: Option<String>,
    pub published_only: bool,
    /// Return per-occurrence match lists (search) and line diffs (preview).
    pub include_content: bool,
}

impl SearchOptions {
    /// Category filter with blank values treated as absent.
    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Number of UTF-16 code units before `byte_idx`.
pub fn utf16_offset(s: &str, byte_idx: usize) -> usize {
    s[..byte_idx].encode_utf16().count()
}

pub fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

/// Up to `n` characters immediately before `end`.
pub fn chars_before(s: &str, end: usize, n: usize) -> &str {
    let head = &s[..end];
    if n == 0 {
        return "";
    }
    let start = head
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &head[start..]
}

/// Up to `n` characters starting at `start`.
pub fn chars_after(s: &str, start: usize, n: usize) -> &str {
    let tail = &s[start..];
    let end = tail
        .char_indices()
        .nth(n)
        .map(|(i, _)| i)
        .unwrap_or(tail.len());
    &tail[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16_offsets_count_surrogate_pairs() {
        let s = "a😀b";
        assert_eq!(utf16_offset(s, 0), 0);
        assert_eq!(utf16_offset(s, 1), 1);
        // the emoji is 4 bytes in UTF-8 and 2 code units in UTF-16
        assert_eq!(utf16_offset(s, 5), 3);
        assert_eq!(utf16_len(s), 4);
    }

    #[test]
    fn context_windows_respect_char_boundaries() {
        let s = "東京タワーと東京駅";
        let idx = s.rfind("東京").unwrap();
        assert_eq!(chars_before(s, idx, 2), "ーと");
        assert_eq!(chars_after(s, idx, 3), "東京駅");
        assert_eq!(chars_before(s, idx, 100), "東京タワーと");
        assert_eq!(chars_after(s, idx, 100), "東京駅");
        assert_eq!(chars_before(s, idx, 0), "");
    }

    #[test]
    fn blank_category_is_no_filter() {
        let blank = SearchOptions {
            category: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(blank.category_filter(), None);
    }
}
