use crate::application::dto::bulk_replace::{BulkSearchOutcome, BulkStatus};
use crate::application::ports::article_repository::ArticleRepository;
use crate::application::services::bulk_replace::SearchOptions;
use crate::application::use_cases::bulk_replace::{BulkReplaceError, scan_articles};

pub struct SearchArticles<'a, R: ArticleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ArticleRepository + ?Sized> SearchArticles<'a, R> {
    pub async fn execute(
        &self,
        term: &str,
        options: &SearchOptions,
    ) -> Result<BulkSearchOutcome, BulkReplaceError> {
        let results: Vec<_> = scan_articles(self.repo, term, options)
            .await?
            .into_iter()
            .map(|s| s.result)
            .collect();

        let ready_count = results
            .iter()
            .filter(|r| r.status == BulkStatus::Ready)
            .count();
        let already_linked_count = results.len() - ready_count;
        let total_matches = results.iter().map(|r| r.match_count).sum();
        tracing::debug!(
            total = results.len(),
            ready_count,
            already_linked_count,
            "bulk_search_completed"
        );
        Ok(BulkSearchOutcome {
            total: results.len(),
            total_matches,
            ready_count,
            already_linked_count,
            results,
        })
    }
}
