use crate::application::ports::article_repository::ArticleRepository;
use crate::domain::articles::article::ReplacementRun;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

pub struct ListReplacementRuns<'a, R: ArticleRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: ArticleRepository + ?Sized> ListReplacementRuns<'a, R> {
    pub async fn execute(&self, limit: Option<i64>) -> anyhow::Result<Vec<ReplacementRun>> {
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.repo.recent_runs(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::article_repository::ArticleRepository;
    use crate::application::use_cases::bulk_replace::test_support::InMemoryArticles;
    use crate::domain::articles::article::NewReplacementRun;

    #[tokio::test]
    async fn lists_newest_first_within_limit() {
        let repo = InMemoryArticles::default();
        for i in 0..3 {
            repo.apply_content_updates(
                &[],
                &NewReplacementRun {
                    search_term: format!("term{i}"),
                    replace_term: "x".into(),
                    affected_articles: i,
                    total_changes: i,
                    skipped_articles: 0,
                },
            )
            .await
            .unwrap();
        }
        let uc = ListReplacementRuns { repo: &repo };
        let runs = uc.execute(Some(2)).await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].search_term, "term2");

        let clamped = uc.execute(Some(0)).await.unwrap();
        assert_eq!(clamped.len(), 1);
    }
}
