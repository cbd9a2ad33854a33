//! # api-adapters
//!
//! The web routing and orchestration layer for Whispering Walls. Handlers
//! stay thin: boundary validation and status mapping here, everything else
//! in the service layer.

pub mod admin;
pub mod error;
pub mod extract;
pub mod handlers;

use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use services::{CatalogService, ModerationService, VoteService, WhisperService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub whispers: WhisperService,
    pub votes: VoteService,
    pub moderation: ModerationService,
    pub catalog: CatalogService,
}

/// Builds the full API router. Admin routes trust the upstream auth layer
/// to have verified the `x-admin-user` assertion (see `extract::AdminUser`).
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public surface
        .route(
            "/api/whispers",
            get(handlers::list_whispers).post(handlers::create_whisper),
        )
        .route("/api/whispers/{id}", get(handlers::get_whisper))
        .route("/api/whispers/{id}/replies", post(handlers::create_reply))
        .route("/api/vote", post(handlers::cast_vote))
        .route("/api/report", post(handlers::report_content))
        .route("/api/tags", get(handlers::list_tags))
        .route("/api/themes", get(handlers::list_themes))
        .route("/api/themes/current", get(handlers::current_theme))
        // Admin surface
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/flagged", get(admin::flagged_content))
        .route(
            "/api/admin/content/{type}/{id}/approve",
            post(admin::approve_content),
        )
        .route(
            "/api/admin/content/{type}/{id}",
            delete(admin::delete_content),
        )
        .route("/api/admin/tags/mood", post(admin::create_mood_tag))
        .route(
            "/api/admin/tags/mood/{id}",
            delete(admin::delete_mood_tag),
        )
        .route("/api/admin/tags/topic", post(admin::create_topic_tag))
        .route(
            "/api/admin/tags/topic/{id}",
            delete(admin::delete_topic_tag),
        )
        .route("/api/admin/themes", post(admin::create_theme))
        .route(
            "/api/admin/themes/{id}",
            put(admin::update_theme).delete(admin::delete_theme),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_policy())
        .with_state(state)
}

// The UI and API may live on different subdomains.
fn cors_policy() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}
