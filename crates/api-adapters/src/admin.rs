//! Administrative handlers. Every mutation lands in the audit log via the
//! service layer.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use domains::{
    BoardStats, ContentType, FlaggedItem, MoodTag, NewTag, NewTheme, Theme, ThemePatch, TopicTag,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::AdminUser;
use crate::AppState;

pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<BoardStats>> {
    Ok(Json(state.moderation.stats().await?))
}

pub async fn flagged_content(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<FlaggedItem>>> {
    Ok(Json(state.moderation.list_flagged().await?))
}

/// Clears the flag, restoring the content to public listings. Approving
/// something already gone is a no-op success.
pub async fn approve_content(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path((content_type, id)): Path<(ContentType, Uuid)>,
) -> ApiResult<Json<Value>> {
    let approved = state
        .moderation
        .approve_content(&admin, content_type, id)
        .await?;
    Ok(Json(json!({ "message": "content approved", "approved": approved })))
}

/// Deletes reported content; replies go with their whisper. Deleting
/// something already gone is a no-op success.
pub async fn delete_content(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path((content_type, id)): Path<(ContentType, Uuid)>,
) -> ApiResult<Json<Value>> {
    let deleted = state
        .moderation
        .delete_content(&admin, content_type, id)
        .await?;
    Ok(Json(json!({ "message": "content deleted", "deleted": deleted })))
}

pub async fn create_mood_tag(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(new): Json<NewTag>,
) -> ApiResult<(StatusCode, Json<MoodTag>)> {
    let tag = state.catalog.create_mood_tag(&admin, new).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn delete_mood_tag(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let deleted = state.catalog.delete_mood_tag(&admin, id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

pub async fn create_topic_tag(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(new): Json<NewTag>,
) -> ApiResult<(StatusCode, Json<TopicTag>)> {
    let tag = state.catalog.create_topic_tag(&admin, new).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn delete_topic_tag(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let deleted = state.catalog.delete_topic_tag(&admin, id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

pub async fn create_theme(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(new): Json<NewTheme>,
) -> ApiResult<(StatusCode, Json<Theme>)> {
    let theme = state.catalog.create_theme(&admin, new).await?;
    Ok((StatusCode::CREATED, Json(theme)))
}

pub async fn update_theme(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<ThemePatch>,
) -> ApiResult<Json<Value>> {
    let updated = state.catalog.update_theme(&admin, id, patch).await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn delete_theme(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let deleted = state.catalog.delete_theme(&admin, id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
