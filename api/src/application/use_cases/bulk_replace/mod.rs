pub mod commit;
pub mod history;
pub mod preview;
pub mod search;

use crate::application::dto::bulk_replace::{BulkResultDto, BulkStatus, MatchDto};
use crate::application::ports::article_repository::{
    ArticleRepository, ArticleWriteError, ContentFilter,
};
use crate::application::services::bulk_replace::matcher::find_all_matches;
use crate::application::services::bulk_replace::resolver::{FirstMatch, classify_first_match};
use crate::application::services::bulk_replace::{SearchOptions, utf16_offset};
use crate::domain::articles::article::Article;

#[derive(thiserror::Error, Debug)]
pub enum BulkReplaceError {
    #[error("search term must not be empty")]
    InvalidInput,
    #[error("failed to load articles")]
    StoreRead(#[source] anyhow::Error),
    #[error("failed to apply replacements")]
    StoreWrite(#[source] ArticleWriteError),
}

pub(crate) fn validate_term(term: &str) -> Result<(), BulkReplaceError> {
    if term.trim().is_empty() {
        return Err(BulkReplaceError::InvalidInput);
    }
    Ok(())
}

/// An article as loaded for the scan, with its classification.
pub(crate) struct ScannedArticle {
    pub article: Article,
    pub result: BulkResultDto,
}

pub(crate) async fn scan_articles<R: ArticleRepository + ?Sized>(
    repo: &R,
    term: &str,
    options: &SearchOptions,
) -> Result<Vec<ScannedArticle>, BulkReplaceError> {
    validate_term(term)?;
    let filter = ContentFilter {
        needle: term.to_string(),
        case_sensitive: options.case_sensitive,
        category: options.category_filter().map(str::to_string),
        published_only: options.published_only,
    };
    let articles = repo
        .find_containing(&filter)
        .await
        .map_err(BulkReplaceError::StoreRead)?;

    let mut scanned = Vec::with_capacity(articles.len());
    for article in articles {
        if let Some(result) = classify_article(&article, term, options) {
            scanned.push(ScannedArticle { article, result });
        }
    }
    Ok(scanned)
}

/// `None` when the term does not actually occur under the given options.
pub(crate) fn classify_article(
    article: &Article,
    term: &str,
    options: &SearchOptions,
) -> Option<BulkResultDto> {
    let (status, linked_text, linked_url) =
        match classify_first_match(&article.content, term, options) {
            FirstMatch::NotFound => return None,
            FirstMatch::Outside { .. } => (BulkStatus::Ready, None, None),
            FirstMatch::Linked {
                link_text,
                link_url,
                ..
            } => (BulkStatus::AlreadyLinked, Some(link_text), Some(link_url)),
        };
    let matches = find_all_matches(&article.content, term, options);
    let match_count = matches.len();
    let matches = options.include_content.then(|| {
        matches
            .into_iter()
            .map(|m| MatchDto {
                index: utf16_offset(&article.content, m.index),
                matched_text: m.matched_text,
                context_before: m.context_before,
                context_after: m.context_after,
            })
            .collect()
    });
    Some(BulkResultDto {
        id: article.id,
        title: article.title.clone(),
        slug: article.slug.clone(),
        category: article.category.clone(),
        published: article.published,
        match_count,
        status,
        linked_text,
        linked_url,
        matches,
    })
}
