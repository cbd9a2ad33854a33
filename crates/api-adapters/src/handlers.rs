//! Public (unauthenticated) handlers.
//!
//! Rate limiting for these endpoints is owned by the fronting proxy; by the
//! time a request lands here it has already been admitted.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use domains::{
    ContentType, Flag, MoodTag, NewReply, NewWhisper, Reply, SortOrder, Theme, TopicTag,
    VoteReceipt, VoteType, Whisper, WhisperFilters, WhisperView,
};
use serde::{Deserialize, Serialize};
use services::whispers::DEFAULT_PAGE_SIZE;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::ClientAddr;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListQuery {
    /// Mood tag id filter; unknown ids just match nothing.
    pub mood: Option<Uuid>,
    pub topic: Option<Uuid>,
    pub theme: Option<Uuid>,
    pub sort: Option<SortOrder>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list_whispers(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Vec<WhisperView>>> {
    let limit = q.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let page = q.page.unwrap_or(1).max(1);
    // Saturating arithmetic: page/limit come straight off the query string
    // and an absurd page must not overflow, just land past the data.
    let filters = WhisperFilters {
        mood_tag_id: q.mood,
        topic_tag_id: q.topic,
        theme_id: q.theme,
        sort: q.sort.unwrap_or_default(),
        search: q.search,
        limit,
        offset: page.saturating_sub(1).saturating_mul(limit),
    };
    Ok(Json(state.whispers.list(filters).await?))
}

pub async fn get_whisper(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WhisperView>> {
    Ok(Json(state.whispers.get(id).await?))
}

pub async fn create_whisper(
    State(state): State<AppState>,
    ClientAddr(addr): ClientAddr,
    Json(new): Json<NewWhisper>,
) -> ApiResult<(StatusCode, Json<Whisper>)> {
    let whisper = state.whispers.create_whisper(new, &addr).await?;
    Ok((StatusCode::CREATED, Json(whisper)))
}

pub async fn create_reply(
    State(state): State<AppState>,
    Path(whisper_id): Path<Uuid>,
    ClientAddr(addr): ClientAddr,
    Json(new): Json<NewReply>,
) -> ApiResult<(StatusCode, Json<Reply>)> {
    let reply = state.whispers.create_reply(whisper_id, new, &addr).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub content_type: ContentType,
    pub content_id: Uuid,
    pub vote_type: VoteType,
}

pub async fn cast_vote(
    State(state): State<AppState>,
    ClientAddr(addr): ClientAddr,
    Json(req): Json<VoteRequest>,
) -> ApiResult<Json<VoteReceipt>> {
    let receipt = state
        .votes
        .cast(req.content_type, req.content_id, req.vote_type, &addr)
        .await?;
    Ok(Json(receipt))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub content_type: ContentType,
    pub content_id: Uuid,
    pub reason: String,
}

pub async fn report_content(
    State(state): State<AppState>,
    ClientAddr(addr): ClientAddr,
    Json(req): Json<ReportRequest>,
) -> ApiResult<(StatusCode, Json<Flag>)> {
    let flag = state
        .moderation
        .report(req.content_type, req.content_id, &req.reason, &addr)
        .await?;
    Ok((StatusCode::CREATED, Json(flag)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsResponse {
    pub mood_tags: Vec<MoodTag>,
    pub topic_tags: Vec<TopicTag>,
}

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<TagsResponse>> {
    Ok(Json(TagsResponse {
        mood_tags: state.catalog.mood_tags().await?,
        topic_tags: state.catalog.topic_tags().await?,
    }))
}

pub async fn list_themes(State(state): State<AppState>) -> ApiResult<Json<Vec<Theme>>> {
    Ok(Json(state.catalog.themes().await?))
}

pub async fn current_theme(State(state): State<AppState>) -> ApiResult<Json<Option<Theme>>> {
    Ok(Json(state.catalog.current_theme(Utc::now()).await?))
}
