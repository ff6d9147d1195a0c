use uuid::Uuid;

// Offsets and lengths in these DTOs are UTF-16 code units.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStatus {
    Ready,
    AlreadyLinked,
}

#[derive(Debug, Clone)]
pub struct MatchDto {
    pub index: usize,
    pub matched_text: String,
    pub context_before: String,
    pub context_after: String,
}

#[derive(Debug, Clone)]
pub struct BulkResultDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub category: Option<String>,
    pub published: bool,
    /// Occurrences outside links.
    pub match_count: usize,
    pub status: BulkStatus,
    pub linked_text: Option<String>,
    pub linked_url: Option<String>,
    pub matches: Option<Vec<MatchDto>>,
}

#[derive(Debug, Clone)]
pub struct BulkSearchOutcome {
    pub total: usize,
    pub total_matches: usize,
    pub ready_count: usize,
    pub already_linked_count: usize,
    pub results: Vec<BulkResultDto>,
}

#[derive(Debug, Clone)]
pub struct MatchDetailDto {
    pub position: usize,
    pub matched_text: String,
    pub context_before: String,
    pub context_after: String,
    /// `context_before + replace_term + context_after`
    pub replaced_snippet: String,
}

#[derive(Debug, Clone)]
pub struct PreviewDetailsDto {
    pub original_length: usize,
    pub new_length: usize,
    pub change_count: usize,
    pub match_details: Option<MatchDetailDto>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLineType {
    Added,
    Deleted,
    Context,
}

#[derive(Debug, Clone)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub old_line_number: Option<u32>,
    pub new_line_number: Option<u32>,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct PreviewResultDto {
    pub result: BulkResultDto,
    pub original_content: String,
    pub new_content: String,
    pub preview: PreviewDetailsDto,
    pub message: Option<String>,
    pub diff: Option<Vec<DiffLine>>,
    /// `updated_at` of the content the preview was computed from.
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone)]
pub struct BulkPreviewOutcome {
    pub total: usize,
    pub total_changes: usize,
    pub ready_count: usize,
    pub already_linked_count: usize,
    pub results: Vec<PreviewResultDto>,
}

#[derive(Debug, Clone)]
pub struct CommittedChangeDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub edit_url: String,
    pub public_url: String,
    pub change_count: usize,
}

#[derive(Debug, Clone)]
pub struct BulkCommitOutcome {
    pub success: bool,
    pub affected_articles: usize,
    pub total_changes: usize,
    pub skipped_articles: usize,
    pub already_linked_count: usize,
    pub changes: Vec<CommittedChangeDto>,
}
