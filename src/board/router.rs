use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{JobForm, JobId, KeywordId, SubjectInput};
use super::repository::{BoardRepository, RepositoryError};
use super::service::{BoardError, BoardService};

/// Router builder exposing the board's JSON API.
pub fn board_router<R>(service: Arc<BoardService<R>>) -> Router
where
    R: BoardRepository + 'static,
{
    Router::new()
        .route("/api/v1/jobs", get(list_jobs::<R>).post(create_job::<R>))
        .route(
            "/api/v1/jobs/:id",
            get(job_detail::<R>)
                .put(update_job::<R>)
                .delete(delete_job::<R>),
        )
        .route("/api/v1/jobs/:id/publish", post(publish_job::<R>))
        .route("/api/v1/feed", get(feed::<R>))
        .route(
            "/api/v1/subjects",
            get(subjects::<R>).post(promote_keyword::<R>),
        )
        .route("/api/v1/employers", get(employers::<R>))
        .route("/api/v1/employers/:slug", get(employer_detail::<R>))
        .route("/api/v1/keywords", get(keyword_matcher::<R>))
        .route("/api/v1/keywords/:id", post(keyword_action::<R>))
        .route("/api/v1/curate", get(curation_queue::<R>))
        .route("/api/v1/reports", get(activity_report::<R>))
        .route("/api/v1/users/:username/edits", get(recent_edits::<R>))
        .with_state(service)
}

impl IntoResponse for BoardError {
    fn into_response(self) -> Response {
        let status = match &self {
            BoardError::JobNotFound(_)
            | BoardError::UnknownSubject(_)
            | BoardError::UnknownEmployer(_)
            | BoardError::KeywordNotFound(_)
            | BoardError::PageOutOfRange(_) => StatusCode::NOT_FOUND,
            BoardError::JobGone(_) => StatusCode::GONE,
            BoardError::PublishBlocked(_) => StatusCode::UNPROCESSABLE_ENTITY,
            BoardError::DeletePublished(_) => StatusCode::CONFLICT,
            BoardError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            BoardError::Pagination(_) | BoardError::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default)]
    today: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublishRequest {
    editor: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeywordAction {
    Ignore,
    Unlink,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeywordActionRequest {
    action: KeywordAction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PromoteKeywordRequest {
    keyword_id: u64,
    name: String,
    slug: String,
    #[serde(default)]
    external_id: Option<String>,
}

/// Requested page numbers default to 1 on absence or unparseable input; the
/// paginator handles out-of-range values.
fn page_number(raw: &Option<String>) -> usize {
    raw.as_deref()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(1)
}

fn report_date(raw: &Option<String>) -> DateTime<Utc> {
    raw.as_deref()
        .and_then(|value| NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        .unwrap_or_else(Utc::now)
}

async fn list_jobs<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, BoardError> {
    let page = page_number(&query.page);
    let listing = service.list_jobs(page, query.subject.as_deref())?;
    Ok(Json(listing).into_response())
}

async fn feed<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, BoardError> {
    let feed = service.feed(page_number(&query.page))?;
    Ok(Json(feed).into_response())
}

async fn job_detail<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Path(id): Path<u64>,
) -> Result<Response, BoardError> {
    let job = service.job(JobId(id))?;
    Ok(Json(job).into_response())
}

async fn create_job<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Json(form): Json<JobForm>,
) -> Result<Response, BoardError> {
    let job = service.create_job(form, Utc::now())?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

async fn update_job<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Path(id): Path<u64>,
    Json(form): Json<JobForm>,
) -> Result<Response, BoardError> {
    let job = service.update_job(JobId(id), form, Utc::now())?;
    Ok(Json(job).into_response())
}

async fn publish_job<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Path(id): Path<u64>,
    Json(request): Json<PublishRequest>,
) -> Result<Response, BoardError> {
    let job = service.publish_job(JobId(id), &request.editor, Utc::now())?;
    Ok(Json(job).into_response())
}

async fn delete_job<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Path(id): Path<u64>,
) -> Result<Response, BoardError> {
    service.delete_job(JobId(id), Utc::now())?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn subjects<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, BoardError> {
    let paged = service.subjects(page_number(&query.page))?;
    Ok(Json(paged).into_response())
}

async fn employers<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, BoardError> {
    let paged = service.employers(page_number(&query.page))?;
    Ok(Json(paged).into_response())
}

async fn employer_detail<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Path(slug): Path<String>,
) -> Result<Response, BoardError> {
    let detail = service.employer(&slug)?;
    Ok(Json(detail).into_response())
}

async fn keyword_matcher<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Query(query): Query<PageQuery>,
) -> Result<Response, BoardError> {
    let paged = service.keyword_matcher(page_number(&query.page))?;
    Ok(Json(paged).into_response())
}

async fn keyword_action<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Path(id): Path<u64>,
    Json(request): Json<KeywordActionRequest>,
) -> Result<Response, BoardError> {
    let keyword = match request.action {
        KeywordAction::Ignore => service.ignore_keyword(KeywordId(id))?,
        KeywordAction::Unlink => service.unlink_keyword(KeywordId(id))?,
    };
    Ok(Json(keyword).into_response())
}

async fn promote_keyword<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Json(request): Json<PromoteKeywordRequest>,
) -> Result<Response, BoardError> {
    let subject = service.promote_keyword(
        KeywordId(request.keyword_id),
        SubjectInput {
            name: request.name,
            slug: request.slug,
            external_id: request.external_id,
        },
    )?;
    Ok((StatusCode::CREATED, Json(subject)).into_response())
}

async fn curation_queue<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
) -> Result<Response, BoardError> {
    let queue = service.curation_queue()?;
    Ok(Json(queue).into_response())
}

async fn activity_report<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, BoardError> {
    let report = service.activity_report(report_date(&query.today))?;
    Ok(Json(report).into_response())
}

async fn recent_edits<R: BoardRepository + 'static>(
    State(service): State<Arc<BoardService<R>>>,
    Path(username): Path<String>,
) -> Result<Response, BoardError> {
    let edits = service.recent_edits(&username)?;
    Ok(Json(edits).into_response())
}
