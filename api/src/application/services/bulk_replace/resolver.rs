use super::link_spans::{find_link_spans, span_at};
use super::matcher::build_term_regex;
use super::{MAX_FIRST_MATCH_ATTEMPTS, SearchOptions};

/// Which occurrences of a term a bulk replacement may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementPolicy {
    /// Only the first mention in a document is linked. A document whose first
    /// mention is already linked is left alone entirely.
    FirstMentionOnly,
}

impl ReplacementPolicy {
    pub const fn max_replacements_per_document(self) -> usize {
        match self {
            ReplacementPolicy::FirstMentionOnly => 1,
        }
    }
}

pub const REPLACEMENT_POLICY: ReplacementPolicy = ReplacementPolicy::FirstMentionOnly;

/// Classification of a document by the first occurrence of the term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstMatch {
    NotFound,
    Outside {
        position: usize,
    },
    Linked {
        position: usize,
        link_text: String,
        link_url: String,
    },
}

impl FirstMatch {
    pub fn is_linked(&self) -> bool {
        matches!(self, FirstMatch::Linked { .. })
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            FirstMatch::NotFound => None,
            FirstMatch::Outside { position } | FirstMatch::Linked { position, .. } => {
                Some(*position)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutsideMatch {
    pub matched: String,
    /// Byte offset of the match.
    pub index: usize,
}

impl OutsideMatch {
    pub fn end(&self) -> usize {
        self.index + self.matched.len()
    }
}

/// A single spliced replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub target: OutsideMatch,
    pub new_content: String,
}

pub fn classify_first_match(content: &str, term: &str, options: &SearchOptions) -> FirstMatch {
    let Some(re) = build_term_regex(term, options) else {
        return FirstMatch::NotFound;
    };
    let Some(first) = re.find_iter(content).find(|m| !m.is_empty()) else {
        return FirstMatch::NotFound;
    };
    let spans = find_link_spans(content);
    match span_at(&spans, first.start()) {
        Some(span) => FirstMatch::Linked {
            position: first.start(),
            link_text: span.link_text.clone(),
            link_url: span.url.clone(),
        },
        None => FirstMatch::Outside {
            position: first.start(),
        },
    }
}

pub fn find_first_match_outside_links(
    content: &str,
    term: &str,
    options: &SearchOptions,
) -> Option<OutsideMatch> {
    let re = build_term_regex(term, options)?;
    let spans = find_link_spans(content);
    let mut attempts = 0usize;
    for m in re.find_iter(content) {
        if attempts >= MAX_FIRST_MATCH_ATTEMPTS {
            tracing::debug!(attempts, "first_outside_match_attempt_cap_reached");
            return None;
        }
        attempts += 1;
        if m.is_empty() || span_at(&spans, m.start()).is_some() {
            continue;
        }
        return Some(OutsideMatch {
            matched: m.as_str().to_string(),
            index: m.start(),
        });
    }
    None
}

/// Splices `replace_term` over the first outside occurrence, per
/// [`REPLACEMENT_POLICY`]. `None` when nothing is replaceable.
pub fn replace_first_outside_match(
    content: &str,
    term: &str,
    replace_term: &str,
    options: &SearchOptions,
) -> Option<Replacement> {
    let target = find_first_match_outside_links(content, term, options)?;
    let mut new_content =
        String::with_capacity(content.len() - target.matched.len() + replace_term.len());
    new_content.push_str(&content[..target.index]);
    new_content.push_str(replace_term);
    new_content.push_str(&content[target.end()..]);
    Some(Replacement {
        target,
        new_content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> SearchOptions {
        SearchOptions::default()
    }

    #[test]
    fn first_mention_inside_link_marks_document_linked() {
        let content = "Visit [Tokyo](https://x.com) and Tokyo Tower";
        let first = classify_first_match(content, "Tokyo", &opts());
        assert!(first.is_linked());
        assert_eq!(
            first,
            FirstMatch::Linked {
                position: 7,
                link_text: "Tokyo".into(),
                link_url: "https://x.com".into(),
            }
        );
        // a later outside mention exists but the document still counts as linked
        assert!(find_first_match_outside_links(content, "Tokyo", &opts()).is_some());
    }

    #[test]
    fn first_mention_outside_link_is_ready() {
        let content = "Kyoto is famous. Later, Kyoto again.";
        let first = classify_first_match(content, "Kyoto", &opts());
        assert_eq!(first, FirstMatch::Outside { position: 0 });
        assert!(!first.is_linked());
    }

    #[test]
    fn missing_term_is_not_found() {
        let first = classify_first_match("nothing here", "Osaka", &opts());
        assert_eq!(first, FirstMatch::NotFound);
        assert_eq!(first.position(), None);
        assert!(find_first_match_outside_links("nothing here", "Osaka", &opts()).is_none());
    }

    #[test]
    fn skips_linked_matches_when_walking() {
        let content = "[sakura](https://a.com) then sakura";
        let m = find_first_match_outside_links(content, "sakura", &opts()).unwrap();
        assert_eq!(m.index, content.rfind("sakura").unwrap());
        assert_eq!(m.matched, "sakura");
    }

    #[test]
    fn all_matches_linked_yields_none() {
        let content = "[sakura](https://a.com) and [Sakura](https://b.com)";
        assert!(find_first_match_outside_links(content, "sakura", &opts()).is_none());
    }

    #[test]
    fn resolution_is_deterministic() {
        let content = "[x](y) alpha beta alpha [alpha](z) alpha";
        let first = find_first_match_outside_links(content, "alpha", &opts());
        for _ in 0..10 {
            assert_eq!(find_first_match_outside_links(content, "alpha", &opts()), first);
        }
    }

    #[test]
    fn attempt_cap_degrades_to_none() {
        let mut content = String::new();
        for _ in 0..MAX_FIRST_MATCH_ATTEMPTS {
            content.push_str("[kw](https://a.com) ");
        }
        content.push_str("kw");
        assert!(find_first_match_outside_links(&content, "kw", &opts()).is_none());

        let mut below_cap = String::new();
        for _ in 0..MAX_FIRST_MATCH_ATTEMPTS - 1 {
            below_cap.push_str("[kw](https://a.com) ");
        }
        below_cap.push_str("kw");
        assert!(find_first_match_outside_links(&below_cap, "kw", &opts()).is_some());
    }

    #[test]
    fn replaces_only_the_first_outside_occurrence() {
        let content = "Kyoto is famous. Later, Kyoto again.";
        let r = replace_first_outside_match(content, "Kyoto", "[Kyoto](https://y.com)", &opts())
            .unwrap();
        assert_eq!(
            r.new_content,
            "[Kyoto](https://y.com) is famous. Later, Kyoto again."
        );
        assert_eq!(r.target.index, 0);
        assert_eq!(REPLACEMENT_POLICY.max_replacements_per_document(), 1);
    }

    #[test]
    fn replacement_changes_one_contiguous_region() {
        let content = "Alpha beta ALPHA gamma alpha";
        let replace = "[alpha](https://a.com)";
        let r = replace_first_outside_match(content, "alpha", replace, &opts()).unwrap();
        let delta = r.new_content.len() as isize - content.len() as isize;
        assert_eq!(delta, replace.len() as isize - "alpha".len() as isize);
        assert_eq!(&r.new_content[..r.target.index], &content[..r.target.index]);
        assert_eq!(
            &r.new_content[r.target.index..r.target.index + replace.len()],
            replace
        );
        assert_eq!(
            &r.new_content[r.target.index + replace.len()..],
            &content[r.target.end()..]
        );
    }

    #[test]
    fn empty_replacement_deletes_the_occurrence() {
        let r = replace_first_outside_match("foo bar foo", "foo ", "", &opts()).unwrap();
        assert_eq!(r.new_content, "bar foo");
    }

    #[test]
    fn case_insensitive_match_keeps_original_length() {
        let r = replace_first_outside_match("über Über", "ÜBER", "X", &opts()).unwrap();
        assert_eq!(r.target.matched, "über");
        assert_eq!(r.new_content, "X Über");
    }
}
