use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::bulk_replace::{
    BulkCommitOutcome, BulkPreviewOutcome, BulkResultDto, BulkSearchOutcome, BulkStatus,
    CommittedChangeDto, DiffLine as DiffLineDto, DiffLineType as DiffLineTypeDto, MatchDetailDto,
    MatchDto, PreviewResultDto,
};
use crate::application::ports::article_repository::ArticleWriteError;
use crate::application::services::bulk_replace::SearchOptions;
use crate::application::use_cases::bulk_replace::BulkReplaceError;
use crate::application::use_cases::bulk_replace::commit::CommitReplacement;
use crate::application::use_cases::bulk_replace::history::ListReplacementRuns;
use crate::application::use_cases::bulk_replace::preview::PreviewReplacement;
use crate::application::use_cases::bulk_replace::search::SearchArticles;
use crate::bootstrap::app_context::AppContext;
use crate::domain::articles::article::ReplacementRun;

#[derive(Debug, Deserialize, Default, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptionsPayload {
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub category: Option<String>,
    pub published_only: bool,
    pub include_content: bool,
}

impl From<SearchOptionsPayload> for SearchOptions {
    fn from(value: SearchOptionsPayload) -> Self {
        SearchOptions {
            case_sensitive: value.case_sensitive,
            whole_word: value.whole_word,
            category: value.category,
            published_only: value.published_only,
            include_content: value.include_content,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkSearchRequest {
    #[serde(default)]
    pub search_term: String,
    #[serde(default)]
    pub options: SearchOptionsPayload,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkReplaceRequest {
    #[serde(default)]
    pub search_term: String,
    /// Required. May be empty, which deletes the first unlinked occurrence.
    pub replace_term: String,
    #[serde(default)]
    pub options: SearchOptionsPayload,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchItem {
    pub index: usize,
    pub matched_text: String,
    pub context_before: String,
    pub context_after: String,
}

impl From<MatchDto> for MatchItem {
    fn from(m: MatchDto) -> Self {
        MatchItem {
            index: m.index,
            matched_text: m.matched_text,
            context_before: m.context_before,
            context_after: m.context_after,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BulkStatusKind {
    Ready,
    AlreadyLinked,
}

impl From<BulkStatus> for BulkStatusKind {
    fn from(value: BulkStatus) -> Self {
        match value {
            BulkStatus::Ready => BulkStatusKind::Ready,
            BulkStatus::AlreadyLinked => BulkStatusKind::AlreadyLinked,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkResultItem {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub category: Option<String>,
    pub published: bool,
    pub match_count: usize,
    pub status: BulkStatusKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchItem>>,
}

impl From<BulkResultDto> for BulkResultItem {
    fn from(r: BulkResultDto) -> Self {
        BulkResultItem {
            id: r.id,
            title: r.title,
            slug: r.slug,
            category: r.category,
            published: r.published,
            match_count: r.match_count,
            status: r.status.into(),
            linked_text: r.linked_text,
            linked_url: r.linked_url,
            matches: r
                .matches
                .map(|ms| ms.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkSearchResponse {
    pub total: usize,
    pub total_matches: usize,
    pub ready_count: usize,
    pub already_linked_count: usize,
    pub results: Vec<BulkResultItem>,
}

impl From<BulkSearchOutcome> for BulkSearchResponse {
    fn from(o: BulkSearchOutcome) -> Self {
        BulkSearchResponse {
            total: o.total,
            total_matches: o.total_matches,
            ready_count: o.ready_count,
            already_linked_count: o.already_linked_count,
            results: o.results.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub position: usize,
    pub matched_text: String,
    pub context_before: String,
    pub context_after: String,
    pub replaced_snippet: String,
}

impl From<MatchDetailDto> for MatchDetail {
    fn from(d: MatchDetailDto) -> Self {
        MatchDetail {
            position: d.position,
            matched_text: d.matched_text,
            context_before: d.context_before,
            context_after: d.context_after,
            replaced_snippet: d.replaced_snippet,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewDetails {
    pub original_length: usize,
    pub new_length: usize,
    pub change_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_details: Option<MatchDetail>,
}

#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "lowercase")]
pub enum DiffLineKind {
    Added,
    Deleted,
    Context,
}

impl From<DiffLineTypeDto> for DiffLineKind {
    fn from(value: DiffLineTypeDto) -> Self {
        match value {
            DiffLineTypeDto::Added => DiffLineKind::Added,
            DiffLineTypeDto::Deleted => DiffLineKind::Deleted,
            DiffLineTypeDto::Context => DiffLineKind::Context,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DiffLineItem {
    pub line_type: DiffLineKind,
    pub old_line_number: Option<u32>,
    pub new_line_number: Option<u32>,
    pub content: String,
}

impl From<DiffLineDto> for DiffLineItem {
    fn from(value: DiffLineDto) -> Self {
        Self {
            line_type: value.line_type.into(),
            old_line_number: value.old_line_number,
            new_line_number: value.new_line_number,
            content: value.content,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResultItem {
    #[serde(flatten)]
    pub result: BulkResultItem,
    pub original_content: String,
    pub new_content: String,
    pub preview: PreviewDetails,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<Vec<DiffLineItem>>,
}

impl From<PreviewResultDto> for PreviewResultItem {
    fn from(r: PreviewResultDto) -> Self {
        PreviewResultItem {
            result: r.result.into(),
            original_content: r.original_content,
            new_content: r.new_content,
            preview: PreviewDetails {
                original_length: r.preview.original_length,
                new_length: r.preview.new_length,
                change_count: r.preview.change_count,
                match_details: r.preview.match_details.map(Into::into),
            },
            message: r.message,
            diff: r.diff.map(|lines| lines.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPreviewResponse {
    pub total: usize,
    pub total_changes: usize,
    pub ready_count: usize,
    pub already_linked_count: usize,
    pub results: Vec<PreviewResultItem>,
}

impl From<BulkPreviewOutcome> for BulkPreviewResponse {
    fn from(o: BulkPreviewOutcome) -> Self {
        BulkPreviewResponse {
            total: o.total,
            total_changes: o.total_changes,
            ready_count: o.ready_count,
            already_linked_count: o.already_linked_count,
            results: o.results.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommittedChange {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub edit_url: String,
    pub public_url: String,
    pub change_count: usize,
}

impl From<CommittedChangeDto> for CommittedChange {
    fn from(c: CommittedChangeDto) -> Self {
        CommittedChange {
            id: c.id,
            title: c.title,
            slug: c.slug,
            edit_url: c.edit_url,
            public_url: c.public_url,
            change_count: c.change_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkCommitResponse {
    pub success: bool,
    pub affected_articles: usize,
    pub total_changes: usize,
    pub skipped_articles: usize,
    pub already_linked_count: usize,
    pub changes: Vec<CommittedChange>,
}

impl From<BulkCommitOutcome> for BulkCommitResponse {
    fn from(o: BulkCommitOutcome) -> Self {
        BulkCommitResponse {
            success: o.success,
            affected_articles: o.affected_articles,
            total_changes: o.total_changes,
            skipped_articles: o.skipped_articles,
            already_linked_count: o.already_linked_count,
            changes: o.changes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementRunItem {
    pub id: Uuid,
    pub search_term: String,
    pub replace_term: String,
    pub affected_articles: i32,
    pub total_changes: i32,
    pub skipped_articles: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ReplacementRun> for ReplacementRunItem {
    fn from(r: ReplacementRun) -> Self {
        ReplacementRunItem {
            id: r.id,
            search_term: r.search_term,
            replace_term: r.replace_term,
            affected_articles: r.affected_articles,
            total_changes: r.total_changes,
            skipped_articles: r.skipped_articles,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: BulkReplaceError) -> ApiError {
    let status = match &err {
        BulkReplaceError::InvalidInput => StatusCode::BAD_REQUEST,
        BulkReplaceError::StoreRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        BulkReplaceError::StoreWrite(ArticleWriteError::Conflict { .. }) => StatusCode::CONFLICT,
        BulkReplaceError::StoreWrite(ArticleWriteError::Storage(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        tracing::error!(error = ?err, "bulk_replace_failed");
    } else {
        tracing::debug!(error = %err, "bulk_replace_rejected");
    }
    let error = match &err {
        BulkReplaceError::StoreWrite(inner) => format!("{err}: {inner}"),
        _ => err.to_string(),
    };
    (
        status,
        Json(ErrorResponse {
            success: false,
            error,
        }),
    )
}

#[utoipa::path(post, path = "/api/bulk-replace/search", tag = "Bulk Replace",
    request_body = BulkSearchRequest,
    responses((status = 200, body = BulkSearchResponse), (status = 400, body = ErrorResponse)))]
pub async fn search(
    State(ctx): State<AppContext>,
    Json(req): Json<BulkSearchRequest>,
) -> Result<Json<BulkSearchResponse>, ApiError> {
    let repo = ctx.article_repo();
    let uc = SearchArticles {
        repo: repo.as_ref(),
    };
    let options: SearchOptions = req.options.into();
    let out = uc
        .execute(&req.search_term, &options)
        .await
        .map_err(error_response)?;
    Ok(Json(out.into()))
}

#[utoipa::path(post, path = "/api/bulk-replace/preview", tag = "Bulk Replace",
    request_body = BulkReplaceRequest,
    responses(
        (status = 200, body = BulkPreviewResponse),
        (status = 400, body = ErrorResponse),
        (status = 422, description = "Malformed body, e.g. missing replaceTerm")
    ))]
pub async fn preview(
    State(ctx): State<AppContext>,
    Json(req): Json<BulkReplaceRequest>,
) -> Result<Json<BulkPreviewResponse>, ApiError> {
    let repo = ctx.article_repo();
    let uc = PreviewReplacement {
        repo: repo.as_ref(),
    };
    let options: SearchOptions = req.options.into();
    let out = uc
        .execute(&req.search_term, &req.replace_term, &options)
        .await
        .map_err(error_response)?;
    Ok(Json(out.into()))
}

#[utoipa::path(post, path = "/api/bulk-replace/commit", tag = "Bulk Replace",
    request_body = BulkReplaceRequest,
    responses(
        (status = 200, body = BulkCommitResponse),
        (status = 400, body = ErrorResponse),
        (status = 409, body = ErrorResponse),
        (status = 422, description = "Malformed body, e.g. missing replaceTerm"),
        (status = 500, body = ErrorResponse)
    ))]
pub async fn commit(
    State(ctx): State<AppContext>,
    Json(req): Json<BulkReplaceRequest>,
) -> Result<Json<BulkCommitResponse>, ApiError> {
    let repo = ctx.article_repo();
    let links = ctx.article_links();
    let uc = CommitReplacement {
        repo: repo.as_ref(),
        links: &links,
    };
    let options: SearchOptions = req.options.into();
    let out = uc
        .execute(&req.search_term, &req.replace_term, &options)
        .await
        .map_err(error_response)?;
    Ok(Json(out.into()))
}

#[utoipa::path(get, path = "/api/bulk-replace/history", tag = "Bulk Replace",
    params(("limit" = Option<i64>, Query, description = "Maximum runs to return (1-100)")),
    responses((status = 200, body = [ReplacementRunItem])))]
pub async fn history(
    State(ctx): State<AppContext>,
    q: Option<Query<HistoryQuery>>,
) -> Result<Json<Vec<ReplacementRunItem>>, StatusCode> {
    let limit = q.and_then(|Query(v)| v.limit);
    let repo = ctx.article_repo();
    let uc = ListReplacementRuns {
        repo: repo.as_ref(),
    };
    let runs = uc.execute(limit).await.map_err(|e| {
        tracing::error!(error = ?e, "bulk_replace_history_failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(runs.into_iter().map(Into::into).collect()))
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/bulk-replace/search", post(search))
        .route("/bulk-replace/preview", post(preview))
        .route("/bulk-replace/commit", post(commit))
        .route("/bulk-replace/history", get(history))
        .with_state(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_options_default_when_missing() {
        let req: BulkReplaceRequest =
            serde_json::from_str(r#"{"searchTerm": "Kyoto", "replaceTerm": ""}"#).unwrap();
        assert_eq!(req.search_term, "Kyoto");
        assert_eq!(req.replace_term, "");
        let opts: SearchOptions = req.options.into();
        assert!(!opts.case_sensitive);
        assert!(!opts.whole_word);

        let req: BulkSearchRequest = serde_json::from_str(
            r#"{"searchTerm": "cat", "options": {"wholeWord": true, "category": "pets"}}"#,
        )
        .unwrap();
        let opts: SearchOptions = req.options.into();
        assert!(opts.whole_word);
        assert_eq!(opts.category.as_deref(), Some("pets"));
    }

    #[test]
    fn replace_term_must_be_present() {
        let err = serde_json::from_str::<BulkReplaceRequest>(r#"{"searchTerm": "sakura"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("replaceTerm"));

        let req: BulkReplaceRequest =
            serde_json::from_str(r#"{"searchTerm": "sakura", "replaceTerm": ""}"#).unwrap();
        assert_eq!(req.replace_term, "");
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let v = serde_json::to_value(BulkStatusKind::from(BulkStatus::AlreadyLinked)).unwrap();
        assert_eq!(v, "already_linked");
        let v = serde_json::to_value(BulkStatusKind::from(BulkStatus::Ready)).unwrap();
        assert_eq!(v, "ready");
    }

    #[test]
    fn error_statuses_follow_failure_kind() {
        let (status, Json(body)) = error_response(BulkReplaceError::InvalidInput);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert_eq!(body.error, "search term must not be empty");

        let (status, _) = error_response(BulkReplaceError::StoreWrite(
            ArticleWriteError::Conflict { id: Uuid::nil() },
        ));
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = error_response(BulkReplaceError::StoreRead(anyhow::anyhow!("down")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn preview_items_flatten_result_fields() {
        let item = PreviewResultItem {
            result: BulkResultItem {
                id: Uuid::nil(),
                title: "t".into(),
                slug: "t".into(),
                category: None,
                published: true,
                match_count: 1,
                status: BulkStatusKind::Ready,
                linked_text: None,
                linked_url: None,
                matches: None,
            },
            original_content: "a".into(),
            new_content: "b".into(),
            preview: PreviewDetails {
                original_length: 1,
                new_length: 1,
                change_count: 1,
                match_details: None,
            },
            message: None,
            diff: None,
        };
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["status"], "ready");
        assert_eq!(v["matchCount"], 1);
        assert_eq!(v["newContent"], "b");
        assert_eq!(v["preview"]["changeCount"], 1);
        assert!(v.get("linkedText").is_none());
    }
}
