//! Whisper and reply submission, listing and retrieval.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    DomainError, DomainResult, NewReply, NewWhisper, Reply, Whisper, WhisperFilters, WhisperStore,
    WhisperView, MAX_NICKNAME_LEN, MAX_TEXT_LEN,
};
use tracing::debug;
use uuid::Uuid;

use crate::identity::IdentityHasher;

/// Default page size for the public listing.
pub const DEFAULT_PAGE_SIZE: i64 = 12;
/// Hard ceiling on the page size a caller can request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Content submission and read paths.
#[derive(Clone)]
pub struct WhisperService {
    store: Arc<dyn WhisperStore>,
    hasher: Arc<IdentityHasher>,
}

impl WhisperService {
    pub fn new(store: Arc<dyn WhisperStore>, hasher: Arc<IdentityHasher>) -> Self {
        Self { store, hasher }
    }

    /// Creates a whisper. Text and nickname are validated here; counters and
    /// moderation state start at their zero values. The submitter is recorded
    /// only as a pseudonymous identity hash.
    pub async fn create_whisper(
        &self,
        new: NewWhisper,
        source_addr: &str,
    ) -> DomainResult<Whisper> {
        validate_text(&new.text)?;
        validate_nickname(new.nickname.as_deref())?;

        let whisper = Whisper {
            id: Uuid::new_v4(),
            text: new.text,
            nickname: normalize_nickname(new.nickname),
            mood_tag_id: new.mood_tag_id,
            topic_tag_id: new.topic_tag_id,
            theme_id: new.theme_id,
            upvotes: 0,
            downvotes: 0,
            buried: false,
            flagged: false,
            ip_hash: self.hasher.hash(source_addr),
            created_at: Utc::now(),
        };
        self.store.insert_whisper(whisper.clone()).await?;
        debug!(whisper_id = %whisper.id, "whisper created");
        Ok(whisper)
    }

    /// Creates a reply under an existing whisper.
    pub async fn create_reply(
        &self,
        whisper_id: Uuid,
        new: NewReply,
        source_addr: &str,
    ) -> DomainResult<Reply> {
        validate_text(&new.text)?;
        validate_nickname(new.nickname.as_deref())?;
        if !self.store.whisper_exists(whisper_id).await? {
            return Err(DomainError::not_found("whisper", whisper_id));
        }

        let reply = Reply {
            id: Uuid::new_v4(),
            whisper_id,
            text: new.text,
            nickname: normalize_nickname(new.nickname),
            upvotes: 0,
            downvotes: 0,
            buried: false,
            flagged: false,
            ip_hash: self.hasher.hash(source_addr),
            created_at: Utc::now(),
        };
        self.store.insert_reply(reply.clone()).await?;
        debug!(reply_id = %reply.id, whisper_id = %whisper_id, "reply created");
        Ok(reply)
    }

    /// Public listing. Pagination is clamped to sane bounds; unknown filter
    /// ids simply match nothing.
    pub async fn list(&self, mut filters: WhisperFilters) -> DomainResult<Vec<WhisperView>> {
        if filters.limit <= 0 {
            filters.limit = DEFAULT_PAGE_SIZE;
        }
        filters.limit = filters.limit.min(MAX_PAGE_SIZE);
        filters.offset = filters.offset.max(0);
        filters.search = filters.search.filter(|s| !s.trim().is_empty());
        self.store.list_whispers(filters).await
    }

    /// Direct fetch with resolved references and visible replies. Buried or
    /// flagged whispers stay reachable by direct link.
    pub async fn get(&self, id: Uuid) -> DomainResult<WhisperView> {
        self.store
            .get_whisper(id)
            .await?
            .ok_or_else(|| DomainError::not_found("whisper", id))
    }
}

fn validate_text(text: &str) -> DomainResult<()> {
    let len = text.chars().count();
    if len == 0 {
        return Err(DomainError::Validation("text must not be empty".into()));
    }
    if len > MAX_TEXT_LEN {
        return Err(DomainError::Validation(format!(
            "text must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_nickname(nickname: Option<&str>) -> DomainResult<()> {
    if let Some(nick) = nickname {
        if nick.chars().count() > MAX_NICKNAME_LEN {
            return Err(DomainError::Validation(format!(
                "nickname must be at most {MAX_NICKNAME_LEN} characters"
            )));
        }
    }
    Ok(())
}

fn normalize_nickname(nickname: Option<String>) -> Option<String> {
    nickname.filter(|n| !n.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockWhisperStore;
    use mockall::predicate;

    fn service(store: MockWhisperStore) -> WhisperService {
        WhisperService::new(
            Arc::new(store),
            Arc::new(IdentityHasher::new(Some("test-salt"))),
        )
    }

    #[tokio::test]
    async fn create_whisper_starts_with_zeroed_state() {
        let mut store = MockWhisperStore::new();
        store
            .expect_insert_whisper()
            .withf(|w| {
                w.upvotes == 0 && w.downvotes == 0 && !w.buried && !w.flagged && !w.ip_hash.is_empty()
            })
            .once()
            .returning(|_| Ok(()));

        let whisper = service(store)
            .create_whisper(
                NewWhisper {
                    text: "Feeling hopeful today".into(),
                    ..Default::default()
                },
                "203.0.113.7",
            )
            .await
            .unwrap();
        assert_eq!(whisper.text, "Feeling hopeful today");
        assert!(!whisper.buried);
    }

    #[tokio::test]
    async fn empty_and_oversized_text_are_rejected() {
        let svc = service(MockWhisperStore::new());
        let empty = svc
            .create_whisper(NewWhisper::default(), "203.0.113.7")
            .await;
        assert!(matches!(empty, Err(DomainError::Validation(_))));

        let long = svc
            .create_whisper(
                NewWhisper {
                    text: "x".repeat(MAX_TEXT_LEN + 1),
                    ..Default::default()
                },
                "203.0.113.7",
            )
            .await;
        assert!(matches!(long, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn oversized_nickname_is_rejected() {
        let svc = service(MockWhisperStore::new());
        let res = svc
            .create_whisper(
                NewWhisper {
                    text: "ok".into(),
                    nickname: Some("n".repeat(MAX_NICKNAME_LEN + 1)),
                    ..Default::default()
                },
                "203.0.113.7",
            )
            .await;
        assert!(matches!(res, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn reply_to_missing_whisper_is_not_found() {
        let whisper_id = Uuid::new_v4();
        let mut store = MockWhisperStore::new();
        store
            .expect_whisper_exists()
            .with(predicate::eq(whisper_id))
            .once()
            .returning(|_| Ok(false));

        let res = service(store)
            .create_reply(
                whisper_id,
                NewReply {
                    text: "me too".into(),
                    nickname: None,
                },
                "203.0.113.7",
            )
            .await;
        assert!(matches!(res, Err(DomainError::NotFound(_, _))));
    }

    #[tokio::test]
    async fn list_clamps_pagination() {
        let mut store = MockWhisperStore::new();
        store
            .expect_list_whispers()
            .withf(|f| f.limit == DEFAULT_PAGE_SIZE && f.offset == 0)
            .once()
            .returning(|_| Ok(vec![]));

        service(store)
            .list(WhisperFilters {
                limit: 0,
                offset: -3,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_caps_oversized_page_requests() {
        let mut store = MockWhisperStore::new();
        store
            .expect_list_whispers()
            .withf(|f| f.limit == MAX_PAGE_SIZE)
            .once()
            .returning(|_| Ok(vec![]));

        service(store)
            .list(WhisperFilters {
                limit: 5_000,
                ..Default::default()
            })
            .await
            .unwrap();
    }
}
