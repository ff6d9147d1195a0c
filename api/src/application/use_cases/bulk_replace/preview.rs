use crate::application::dto::bulk_replace::{
    BulkPreviewOutcome, BulkResultDto, BulkStatus, MatchDetailDto, PreviewDetailsDto,
    PreviewResultDto,
};
use crate::application::ports::article_repository::ArticleRepository;
use crate::application::services::bulk_replace::diff::line_diff;
use crate::application::services::bulk_replace::resolver::replace_first_outside_match;
use crate::application::services::bulk_replace::{
    PREVIEW_CONTEXT_CHARS, SearchOptions, chars_after, chars_before, utf16_len, utf16_offset,
};
use crate::application::use_cases::bulk_replace::{
    BulkReplaceError, ScannedArticle, classify_article, scan_articles,
};
use crate::domain::articles::article::Article;

const ALREADY_LINKED_MESSAGE: &str = "First occurrence is already linked; article left unchanged";
const NO_LONGER_MATCHES_MESSAGE: &str = "No replaceable occurrence in the current content";

pub struct PreviewReplacement<'a, R: ArticleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ArticleRepository + ?Sized> PreviewReplacement<'a, R> {
    pub async fn execute(
        &self,
        term: &str,
        replace_term: &str,
        options: &SearchOptions,
    ) -> Result<BulkPreviewOutcome, BulkReplaceError> {
        let scanned = scan_articles(self.repo, term, options).await?;

        let mut results = Vec::with_capacity(scanned.len());
        for ScannedArticle { article, result } in scanned {
            if result.status == BulkStatus::AlreadyLinked {
                results.push(unchanged(article, result, ALREADY_LINKED_MESSAGE, options));
                continue;
            }

            // The scan may be stale by now; work from what is stored.
            let fresh = self
                .repo
                .get_by_id(article.id)
                .await
                .map_err(BulkReplaceError::StoreRead)?;
            let Some(fresh) = fresh else {
                tracing::debug!(article_id = %article.id, "bulk_preview_article_vanished");
                continue;
            };
            let Some(result) = classify_article(&fresh, term, options) else {
                results.push(unchanged(fresh, result, NO_LONGER_MATCHES_MESSAGE, options));
                continue;
            };
            if result.status == BulkStatus::AlreadyLinked {
                results.push(unchanged(fresh, result, ALREADY_LINKED_MESSAGE, options));
                continue;
            }

            match replace_first_outside_match(&fresh.content, term, replace_term, options) {
                Some(replacement) => {
                    let start = replacement.target.index;
                    let end = replacement.target.end();
                    let context_before = chars_before(&fresh.content, start, PREVIEW_CONTEXT_CHARS);
                    let context_after = chars_after(&fresh.content, end, PREVIEW_CONTEXT_CHARS);
                    let match_details = MatchDetailDto {
                        position: utf16_offset(&fresh.content, start),
                        matched_text: replacement.target.matched.clone(),
                        context_before: context_before.to_string(),
                        context_after: context_after.to_string(),
                        replaced_snippet: format!("{context_before}{replace_term}{context_after}"),
                    };
                    let diff = options
                        .include_content
                        .then(|| line_diff(&fresh.content, &replacement.new_content));
                    results.push(PreviewResultDto {
                        preview: PreviewDetailsDto {
                            original_length: utf16_len(&fresh.content),
                            new_length: utf16_len(&replacement.new_content),
                            change_count: 1,
                            match_details: Some(match_details),
                        },
                        result,
                        updated_at: fresh.updated_at,
                        original_content: fresh.content,
                        new_content: replacement.new_content,
                        message: None,
                        diff,
                    });
                }
                None => results.push(unchanged(fresh, result, NO_LONGER_MATCHES_MESSAGE, options)),
            }
        }

        // Articles whose term vanished since the scan keep `ready` but offer no change.
        let ready_count = results
            .iter()
            .filter(|r| r.result.status == BulkStatus::Ready && r.preview.change_count > 0)
            .count();
        let already_linked_count = results
            .iter()
            .filter(|r| r.result.status == BulkStatus::AlreadyLinked)
            .count();
        let total_changes = results.iter().map(|r| r.preview.change_count).sum();
        tracing::debug!(
            total = results.len(),
            total_changes,
            already_linked_count,
            "bulk_preview_completed"
        );
        Ok(BulkPreviewOutcome {
            total: results.len(),
            total_changes,
            ready_count,
            already_linked_count,
            results,
        })
    }
}

fn unchanged(
    article: Article,
    result: BulkResultDto,
    message: &str,
    options: &SearchOptions,
) -> PreviewResultDto {
    let length = utf16_len(&article.content);
    PreviewResultDto {
        result,
        new_content: article.content.clone(),
        diff: options.include_content.then(Vec::new),
        original_content: article.content,
        preview: PreviewDetailsDto {
            original_length: length,
            new_length: length,
            change_count: 0,
            match_details: None,
        },
        message: Some(message.to_string()),
        updated_at: article.updated_at,
    }
}
