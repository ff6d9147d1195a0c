use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub category: Option<String>,
    pub published: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// One pending content rewrite. `expected_updated_at` is the timestamp observed
/// when the new content was computed; the write is rejected if the row moved on.
#[derive(Debug, Clone)]
pub struct ContentUpdate {
    pub id: Uuid,
    pub content: String,
    pub expected_updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct ReplacementRun {
    pub id: Uuid,
    pub search_term: String,
    pub replace_term: String,
    pub affected_articles: i32,
    pub total_changes: i32,
    pub skipped_articles: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReplacementRun {
    pub search_term: String,
    pub replace_term: String,
    pub affected_articles: i32,
    pub total_changes: i32,
    pub skipped_articles: i32,
}
