use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::article_repository::{
    ArticleRepository, ArticleWriteError, ContentFilter,
};
use crate::domain::articles::article::{
    Article, ContentUpdate, NewReplacementRun, ReplacementRun,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxArticleRepository {
    pub pool: PgPool,
}

impl SqlxArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE wildcards so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

fn map_article(r: PgRow) -> Article {
    Article {
        id: r.get("id"),
        title: r.get("title"),
        slug: r.get("slug"),
        content: r.get("content"),
        category: r.get("category"),
        published: r.get("published"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl ArticleRepository for SqlxArticleRepository {
    async fn find_containing(&self, filter: &ContentFilter) -> anyhow::Result<Vec<Article>> {
        let sql = if filter.case_sensitive {
            r#"SELECT id, title, slug, content, category, published, created_at, updated_at
               FROM articles
               WHERE content LIKE $1 ESCAPE '\'
                 AND ($2::text IS NULL OR category = $2)
                 AND ($3 = FALSE OR published)
               ORDER BY updated_at DESC"#
        } else {
            r#"SELECT id, title, slug, content, category, published, created_at, updated_at
               FROM articles
               WHERE content ILIKE $1 ESCAPE '\'
                 AND ($2::text IS NULL OR category = $2)
                 AND ($3 = FALSE OR published)
               ORDER BY updated_at DESC"#
        };
        let rows = sqlx::query(sql)
            .bind(like_pattern(&filter.needle))
            .bind(filter.category.as_deref())
            .bind(filter.published_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(map_article).collect())
    }

    async fn get_by_id(&self, id: Uuid) -> anyhow::Result<Option<Article>> {
        let row = sqlx::query(
            r#"SELECT id, title, slug, content, category, published, created_at, updated_at
               FROM articles WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(map_article))
    }

    async fn apply_content_updates(
        &self,
        updates: &[ContentUpdate],
        run: &NewReplacementRun,
    ) -> Result<(), ArticleWriteError> {
        let storage = |e: sqlx::Error| ArticleWriteError::Storage(e.into());
        // Dropping `tx` without commit rolls everything back.
        let mut tx = self.pool.begin().await.map_err(storage)?;
        for update in updates {
            let res = sqlx::query(
                r#"UPDATE articles SET content = $1, updated_at = now()
                   WHERE id = $2 AND updated_at = $3"#,
            )
            .bind(&update.content)
            .bind(update.id)
            .bind(update.expected_updated_at)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
            if res.rows_affected() == 0 {
                return Err(ArticleWriteError::Conflict { id: update.id });
            }
        }
        sqlx::query(
            r#"INSERT INTO replacement_runs
                   (search_term, replace_term, affected_articles, total_changes, skipped_articles)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(&run.search_term)
        .bind(&run.replace_term)
        .bind(run.affected_articles)
        .bind(run.total_changes)
        .bind(run.skipped_articles)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(())
    }

    async fn recent_runs(&self, limit: i64) -> anyhow::Result<Vec<ReplacementRun>> {
        let rows = sqlx::query(
            r#"SELECT id, search_term, replace_term, affected_articles, total_changes,
                      skipped_articles, created_at
               FROM replacement_runs
               ORDER BY created_at DESC
               LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ReplacementRun {
                id: r.get("id"),
                search_term: r.get("search_term"),
                replace_term: r.get("replace_term"),
                affected_articles: r.get("affected_articles"),
                total_changes: r.get("total_changes"),
                skipped_articles: r.get("skipped_articles"),
                created_at: r.get("created_at"),
            })
            .collect())
    }
}
