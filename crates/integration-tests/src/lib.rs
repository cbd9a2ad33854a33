//! Shared fixtures for the integration test suite: an in-memory SQLite
//! store, fully wired services, and a router driven through `tower`
//! without binding a socket.

use std::sync::Arc;

use api_adapters::{router, AppState};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use domains::{NewReply, NewWhisper, Reply, Whisper, WhisperStore};
use services::{CatalogService, IdentityHasher, ModerationService, VoteService, WhisperService};
use storage_adapters::{connect, ensure_schema, SqliteWhisperStore};
use tower::ServiceExt;

pub const TEST_SALT: &str = "integration-test-salt";

/// Everything a test needs: the HTTP surface plus direct handles for
/// seeding and inspecting state behind it.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn WhisperStore>,
    pub whispers: WhisperService,
    pub votes: VoteService,
    pub moderation: ModerationService,
    pub catalog: CatalogService,
}

pub async fn memory_store() -> Arc<dyn WhisperStore> {
    let pool = connect("sqlite::memory:").await.expect("open in-memory db");
    ensure_schema(&pool).await.expect("create schema");
    Arc::new(SqliteWhisperStore::new(pool))
}

pub async fn test_app() -> TestApp {
    let store = memory_store().await;
    let hasher = Arc::new(IdentityHasher::new(Some(TEST_SALT)));

    let whispers = WhisperService::new(store.clone(), hasher.clone());
    let votes = VoteService::new(store.clone(), hasher.clone());
    let moderation = ModerationService::new(store.clone(), hasher);
    let catalog = CatalogService::new(store.clone());

    let state = AppState {
        whispers: whispers.clone(),
        votes: votes.clone(),
        moderation: moderation.clone(),
        catalog: catalog.clone(),
    };

    TestApp {
        router: router(state),
        store,
        whispers,
        votes,
        moderation,
        catalog,
    }
}

impl TestApp {
    /// Drives one request through the router. `source` becomes the
    /// `x-forwarded-for` header, so each caller identity is distinct.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        source: &str,
        admin: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", source);
        if let Some(admin) = admin {
            builder = builder.header("x-admin-user", admin);
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("route request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        self.request(Method::GET, uri, "198.51.100.1", None, None).await
    }

    /// Seeds a whisper directly through the service layer.
    pub async fn seed_whisper(&self, text: &str, source: &str) -> Whisper {
        self.whispers
            .create_whisper(
                NewWhisper {
                    text: text.to_string(),
                    ..Default::default()
                },
                source,
            )
            .await
            .expect("seed whisper")
    }

    /// Seeds a reply directly through the service layer.
    pub async fn seed_reply(&self, whisper_id: uuid::Uuid, text: &str, source: &str) -> Reply {
        self.whispers
            .create_reply(
                whisper_id,
                NewReply {
                    text: text.to_string(),
                    nickname: None,
                },
                source,
            )
            .await
            .expect("seed reply")
    }
}
