//! # Moderation Queue
//!
//! User reports append to a flag ledger and hide the target from public
//! listings; administrators review the queue and either delete the content
//! or approve it, restoring visibility. Every administrative mutation is
//! appended to the audit log.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    AdminAction, BoardStats, ContentType, DomainError, DomainResult, Flag, FlaggedItem,
    WhisperStore,
};
use tracing::info;
use uuid::Uuid;

use crate::identity::IdentityHasher;

/// Audit log action types written by this module.
pub mod action {
    pub const DELETE_CONTENT: &str = "delete_content";
    pub const APPROVE_CONTENT: &str = "approve_content";
}

#[derive(Clone)]
pub struct ModerationService {
    store: Arc<dyn WhisperStore>,
    hasher: Arc<IdentityHasher>,
}

impl ModerationService {
    pub fn new(store: Arc<dyn WhisperStore>, hasher: Arc<IdentityHasher>) -> Self {
        Self { store, hasher }
    }

    /// Records a report against a piece of content and marks it flagged.
    /// Repeated reports append further flag rows; the flagged state itself
    /// is idempotent.
    pub async fn report(
        &self,
        content_type: ContentType,
        content_id: Uuid,
        reason: &str,
        source_addr: &str,
    ) -> DomainResult<Flag> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::Validation("report reason is required".into()));
        }

        let exists = match content_type {
            ContentType::Whisper => self.store.whisper_exists(content_id).await?,
            ContentType::Reply => self.store.get_reply(content_id).await?.is_some(),
        };
        if !exists {
            return Err(DomainError::not_found(content_type.as_str(), content_id));
        }

        // Flag row first, hide second: a failure between the two leaves the
        // content visible with a queue entry, never hidden without one.
        let flag = Flag {
            id: Uuid::new_v4(),
            content_type,
            content_id,
            reason: reason.to_string(),
            ip_hash: self.hasher.hash(source_addr),
            created_at: Utc::now(),
        };
        self.store.insert_flag(flag.clone()).await?;
        match content_type {
            ContentType::Whisper => self.store.set_whisper_flagged(content_id, true).await?,
            ContentType::Reply => self.store.set_reply_flagged(content_id, true).await?,
        };
        info!(content = content_type.as_str(), %content_id, "content reported");
        Ok(flag)
    }

    /// The full review queue: every flag joined with its target.
    pub async fn list_flagged(&self) -> DomainResult<Vec<FlaggedItem>> {
        self.store.list_flagged().await
    }

    /// Deletes reported content (cascading replies for whispers) and logs
    /// the action. Deleting something already gone is a no-op success and
    /// leaves no audit entry.
    pub async fn delete_content(
        &self,
        admin_user_id: &str,
        content_type: ContentType,
        content_id: Uuid,
    ) -> DomainResult<bool> {
        let deleted = match content_type {
            ContentType::Whisper => self.store.delete_whisper(content_id).await?,
            ContentType::Reply => self.store.delete_reply(content_id).await?,
        };
        if deleted {
            self.store
                .append_admin_action(admin_action(
                    admin_user_id,
                    action::DELETE_CONTENT,
                    Some(content_type),
                    Some(content_id),
                    None,
                ))
                .await?;
            info!(
                admin = admin_user_id,
                content = content_type.as_str(),
                %content_id,
                "content deleted"
            );
        }
        Ok(deleted)
    }

    /// Clears the flagged state, restoring the content to public listings,
    /// and logs the action.
    pub async fn approve_content(
        &self,
        admin_user_id: &str,
        content_type: ContentType,
        content_id: Uuid,
    ) -> DomainResult<bool> {
        let cleared = match content_type {
            ContentType::Whisper => self.store.set_whisper_flagged(content_id, false).await?,
            ContentType::Reply => self.store.set_reply_flagged(content_id, false).await?,
        };
        if cleared {
            self.store
                .append_admin_action(admin_action(
                    admin_user_id,
                    action::APPROVE_CONTENT,
                    Some(content_type),
                    Some(content_id),
                    None,
                ))
                .await?;
            info!(
                admin = admin_user_id,
                content = content_type.as_str(),
                %content_id,
                "content approved"
            );
        }
        Ok(cleared)
    }

    /// Dashboard counters, anchored to the caller's clock.
    pub async fn stats(&self) -> DomainResult<BoardStats> {
        self.store.stats(Utc::now()).await
    }
}

/// Builds an audit record for an administrative mutation.
pub(crate) fn admin_action(
    admin_user_id: &str,
    action_type: &str,
    target_type: Option<ContentType>,
    target_id: Option<Uuid>,
    details: Option<String>,
) -> AdminAction {
    AdminAction {
        id: Uuid::new_v4(),
        admin_user_id: admin_user_id.to_string(),
        action_type: action_type.to_string(),
        target_type,
        target_id,
        details,
        created_at: Utc::now(),
    }
}
