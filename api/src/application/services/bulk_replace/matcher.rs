use regex::{Regex, RegexBuilder};

use super::link_spans::{LinkSpan, find_link_spans, span_at};
use super::{
    MATCH_CONTEXT_CHARS, MAX_MATCHES_PER_DOCUMENT, SearchOptions, chars_after, chars_before,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCheck {
    pub is_inside: bool,
    pub link_info: Option<LinkSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOccurrence {
    /// Byte offset of the match in the scanned content.
    pub index: usize,
    pub matched_text: String,
    pub context_before: String,
    pub context_after: String,
}

pub fn is_inside_any_link(content: &str, position: usize) -> LinkCheck {
    let spans = find_link_spans(content);
    let link_info = span_at(&spans, position).cloned();
    LinkCheck {
        is_inside: link_info.is_some(),
        link_info,
    }
}

/// Compiles the literal `term` into a matcher honoring the options.
/// Returns `None` for a blank term or a term too large to compile.
pub fn build_term_regex(term: &str, options: &SearchOptions) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }
    let escaped = regex::escape(term);
    let pattern = if options.whole_word {
        format!(r"\b{}\b", escaped)
    } else {
        escaped
    };
    match RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::debug!(error = %e, "term_regex_build_failed");
            None
        }
    }
}

/// Occurrences of `term` that sit outside every inline link, with context.
pub fn find_all_matches(
    content: &str,
    term: &str,
    options: &SearchOptions,
) -> Vec<MatchOccurrence> {
    let Some(re) = build_term_regex(term, options) else {
        return Vec::new();
    };
    let spans = find_link_spans(content);
    re.find_iter(content)
        .take(MAX_MATCHES_PER_DOCUMENT)
        .filter(|m| !m.is_empty() && span_at(&spans, m.start()).is_none())
        .map(|m| MatchOccurrence {
            index: m.start(),
            matched_text: m.as_str().to_string(),
            context_before: chars_before(content, m.start(), MATCH_CONTEXT_CHARS).to_string(),
            context_after: chars_after(content, m.end(), MATCH_CONTEXT_CHARS).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn positions_inside_links_are_reported() {
        let content = "Visit [Tokyo](https://x.com) and Tokyo Tower";
        let start = content.find('[').unwrap();
        let end = content.find(')').unwrap() + 1;
        for p in start..end {
            let check = is_inside_any_link(content, p);
            assert!(check.is_inside, "position {p} should be inside");
            assert_eq!(check.link_info.unwrap().url, "https://x.com");
        }
        let outside = content.rfind("Tokyo").unwrap();
        let check = is_inside_any_link(content, outside);
        assert!(!check.is_inside);
        assert!(check.link_info.is_none());
        assert!(!is_inside_any_link(content, 0).is_inside);
    }

    #[test]
    fn linked_occurrences_are_filtered_out() {
        let content = "Visit [Tokyo](https://x.com) and Tokyo Tower";
        let matches = find_all_matches(content, "Tokyo", &opts());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, content.rfind("Tokyo").unwrap());
        assert_eq!(matches[0].context_after, " Tower");
    }

    #[test]
    fn case_insensitive_by_default() {
        let content = "tokyo, TOKYO and Tokyo";
        assert_eq!(find_all_matches(content, "Tokyo", &opts()).len(), 3);

        let sensitive = SearchOptions {
            case_sensitive: true,
            ..opts()
        };
        let matches = find_all_matches(content, "Tokyo", &sensitive);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].matched_text, "Tokyo");
    }

    #[test]
    fn whole_word_skips_embedded_substrings() {
        let content = "concatenate cat";
        let ww = SearchOptions {
            whole_word: true,
            ..opts()
        };
        let matches = find_all_matches(content, "cat", &ww);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 12);

        assert_eq!(find_all_matches(content, "cat", &opts()).len(), 2);
    }

    #[test]
    fn metacharacters_are_literal() {
        let content = "price is $5.00 (approx) not $5x00";
        let matches = find_all_matches(content, "$5.00", &opts());
        assert_eq!(matches.len(), 1);
        assert_eq!(find_all_matches(content, "(approx)", &opts()).len(), 1);
        assert_eq!(find_all_matches("a+b a+b", "a+b", &opts()).len(), 2);
    }

    #[test]
    fn context_is_bounded() {
        let filler = "x".repeat(100);
        let content = format!("{filler}needle{filler}");
        let matches = find_all_matches(&content, "needle", &opts());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].context_before.chars().count(), MATCH_CONTEXT_CHARS);
        assert_eq!(matches[0].context_after.chars().count(), MATCH_CONTEXT_CHARS);
    }

    #[test]
    fn empty_term_matches_nothing() {
        assert!(build_term_regex("", &opts()).is_none());
        assert!(find_all_matches("anything", "", &opts()).is_empty());
    }

    #[test]
    fn match_listing_is_capped() {
        let content = "a ".repeat(MAX_MATCHES_PER_DOCUMENT + 50);
        let matches = find_all_matches(&content, "a", &opts());
        assert_eq!(matches.len(), MAX_MATCHES_PER_DOCUMENT);
    }
}
