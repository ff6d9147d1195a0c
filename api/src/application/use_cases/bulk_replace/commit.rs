use uuid::Uuid;

use crate::application::dto::bulk_replace::{BulkCommitOutcome, BulkStatus, CommittedChangeDto};
use crate::application::ports::article_repository::ArticleRepository;
use crate::application::services::bulk_replace::SearchOptions;
use crate::application::use_cases::bulk_replace::BulkReplaceError;
use crate::application::use_cases::bulk_replace::preview::PreviewReplacement;
use crate::domain::articles::article::{ContentUpdate, NewReplacementRun};

/// Builds operator follow-up links for committed articles.
#[derive(Debug, Clone)]
pub struct ArticleLinks {
    pub admin_base: String,
    pub public_base: String,
}

impl ArticleLinks {
    pub fn edit_url(&self, id: Uuid) -> String {
        format!("{}/articles/{}/edit", self.admin_base, id)
    }

    pub fn public_url(&self, slug: &str) -> String {
        format!("{}/articles/{}", self.public_base, urlencoding::encode(slug))
    }
}

pub struct CommitReplacement<'a, R: ArticleRepository + ?Sized> {
    pub repo: &'a R,
    pub links: &'a ArticleLinks,
}

impl<'a, R: ArticleRepository + ?Sized> CommitReplacement<'a, R> {
    pub async fn execute(
        &self,
        term: &str,
        replace_term: &str,
        options: &SearchOptions,
    ) -> Result<BulkCommitOutcome, BulkReplaceError> {
        // Never reuse an earlier preview; recompute against stored content.
        let preview = PreviewReplacement { repo: self.repo }
            .execute(term, replace_term, options)
            .await?;

        let total = preview.results.len();
        let eligible: Vec<_> = preview
            .results
            .into_iter()
            .filter(|r| r.result.status == BulkStatus::Ready && r.new_content != r.original_content)
            .collect();
        let skipped_articles = total - eligible.len();
        let total_changes: usize = eligible.iter().map(|r| r.preview.change_count).sum();

        if eligible.is_empty() {
            tracing::info!(skipped_articles, "bulk_replace_commit_nothing_to_apply");
            return Ok(BulkCommitOutcome {
                success: true,
                affected_articles: 0,
                total_changes: 0,
                skipped_articles,
                already_linked_count: preview.already_linked_count,
                changes: Vec::new(),
            });
        }

        let updates: Vec<ContentUpdate> = eligible
            .iter()
            .map(|r| ContentUpdate {
                id: r.result.id,
                content: r.new_content.clone(),
                expected_updated_at: r.updated_at,
            })
            .collect();
        let run = NewReplacementRun {
            search_term: term.to_string(),
            replace_term: replace_term.to_string(),
            affected_articles: eligible.len() as i32,
            total_changes: total_changes as i32,
            skipped_articles: skipped_articles as i32,
        };
        self.repo
            .apply_content_updates(&updates, &run)
            .await
            .map_err(BulkReplaceError::StoreWrite)?;

        let changes: Vec<CommittedChangeDto> = eligible
            .into_iter()
            .map(|r| CommittedChangeDto {
                edit_url: self.links.edit_url(r.result.id),
                public_url: self.links.public_url(&r.result.slug),
                id: r.result.id,
                title: r.result.title,
                slug: r.result.slug,
                change_count: r.preview.change_count,
            })
            .collect();
        tracing::info!(
            affected_articles = changes.len(),
            total_changes,
            skipped_articles,
            "bulk_replace_committed"
        );
        Ok(BulkCommitOutcome {
            success: true,
            affected_articles: changes.len(),
            total_changes,
            skipped_articles,
            already_linked_count: preview.already_linked_count,
            changes,
        })
    }
}
