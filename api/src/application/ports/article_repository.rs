use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::articles::article::{
    Article, ContentUpdate, NewReplacementRun, ReplacementRun,
};

/// Substring query over article bodies.
#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub needle: String,
    pub case_sensitive: bool,
    pub category: Option<String>,
    pub published_only: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ArticleWriteError {
    #[error("article {id} changed since it was read")]
    Conflict { id: Uuid },
    #[error("failed to persist article content")]
    Storage(#[source] anyhow::Error),
}

#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Articles whose content contains `filter.needle`, most recently updated first.
    async fn find_containing(&self, filter: &ContentFilter) -> anyhow::Result<Vec<Article>>;

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Article>>;

    /// Writes every update and records `run`, or nothing at all.
    async fn apply_content_updates(
        &self,
        updates: &[ContentUpdate],
        run: &NewReplacementRun,
    ) -> Result<(), ArticleWriteError>;

    async fn recent_runs(&self, limit: i64) -> anyhow::Result<Vec<ReplacementRun>>;
}
