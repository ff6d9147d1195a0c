use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical inline link `[label](url)`. Labels may not contain brackets, so
/// `[a [b]](c)` only yields the inner `[b](c)`. This is a limited grammar on
/// purpose: it is the only link shape the editor writes.
static INLINE_LINK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]*?)\]\(([^)]+)\)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub start: usize,
    pub end: usize,
    pub link_text: String,
    pub url: String,
    pub full_match: String,
}

impl LinkSpan {
    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position < self.end
    }
}

/// All inline links in `content`, left to right and non-overlapping.
pub fn find_link_spans(content: &str) -> Vec<LinkSpan> {
    // captures_iter always advances past the previous match, so this
    // terminates on any input.
    INLINE_LINK_REGEX
        .captures_iter(content)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            if whole.is_empty() {
                return None;
            }
            Some(LinkSpan {
                start: whole.start(),
                end: whole.end(),
                link_text: cap.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
                url: cap.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                full_match: whole.as_str().to_string(),
            })
        })
        .collect()
}

/// The span containing `position`, if any. `spans` must be sorted by start,
/// which [`find_link_spans`] guarantees.
pub fn span_at(spans: &[LinkSpan], position: usize) -> Option<&LinkSpan> {
    let idx = spans.partition_point(|s| s.start <= position);
    if idx == 0 {
        return None;
    }
    let candidate = &spans[idx - 1];
    candidate.contains(position).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_inline_links_with_offsets() {
        let content = "Visit [Tokyo](https://x.com) and [Kyoto](https://y.com).";
        let spans = find_link_spans(content);
        assert_eq!(spans.len(), 2);

        assert_eq!(spans[0].link_text, "Tokyo");
        assert_eq!(spans[0].url, "https://x.com");
        assert_eq!(spans[0].full_match, "[Tokyo](https://x.com)");
        assert_eq!(&content[spans[0].start..spans[0].end], spans[0].full_match);

        assert_eq!(spans[1].link_text, "Kyoto");
        assert!(spans[0].end <= spans[1].start);
    }

    #[test]
    fn nested_bracket_labels_only_match_innermost() {
        let spans = find_link_spans("[outer [inner](https://a.com)](https://b.com)");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].link_text, "inner");
        assert_eq!(spans[0].url, "https://a.com");
    }

    #[test]
    fn ignores_incomplete_constructs() {
        assert!(find_link_spans("[no url]").is_empty());
        assert!(find_link_spans("[empty url]()").is_empty());
        assert!(find_link_spans("(https://x.com) [text] (gap)").is_empty());
        assert!(find_link_spans("").is_empty());
    }

    #[test]
    fn empty_label_is_still_a_link() {
        let spans = find_link_spans("see [](https://x.com)");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].link_text, "");
        assert_eq!(spans[0].start, 4);
    }

    #[test]
    fn images_are_covered_by_their_bracket_part() {
        let content = "![alt](img.png)";
        let spans = find_link_spans(content);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].start, 1);
    }

    #[test]
    fn span_lookup_is_half_open() {
        let content = "a [b](c) d";
        let spans = find_link_spans(content);
        assert!(span_at(&spans, 1).is_none());
        assert!(span_at(&spans, 2).is_some());
        assert!(span_at(&spans, 7).is_some());
        assert!(span_at(&spans, 8).is_none());
        assert!(span_at(&[], 0).is_none());
    }
}
