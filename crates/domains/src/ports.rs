//! # Core Ports
//!
//! The persistence contract the service layer talks to. Any storage adapter
//! must implement [`WhisperStore`] to be wired into the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(any(test, feature = "testing"))]
use mockall::automock;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::{
    AdminAction, BoardStats, ContentType, Flag, FlaggedItem, MoodTag, Reply, Theme, ThemePatch,
    TopicTag, Vote, VoteTally, VoteTransition, Whisper, WhisperFilters, WhisperView,
};

/// Data persistence contract for whispers, replies, votes, flags, tags,
/// themes and the admin audit log.
///
/// Atomicity contract: [`WhisperStore::apply_vote_transition`] must perform
/// the ledger mutation, the counter recount and the burial check inside a
/// single transaction. Counters are always derived from a fresh count over
/// ledger rows, never incremented in place.
#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait WhisperStore: Send + Sync {
    // ── Whisper operations ──────────────────────────────────────────────

    async fn insert_whisper(&self, whisper: Whisper) -> DomainResult<()>;

    /// Public listing: only content with `buried = false AND flagged = false`.
    async fn list_whispers(&self, filters: WhisperFilters) -> DomainResult<Vec<WhisperView>>;

    /// Direct fetch by id. Deliberately NOT filtered by buried/flagged so a
    /// direct link keeps working; only the attached replies are filtered.
    async fn get_whisper(&self, id: Uuid) -> DomainResult<Option<WhisperView>>;

    async fn whisper_exists(&self, id: Uuid) -> DomainResult<bool>;

    /// Deletes the whisper and, by cascade, its replies.
    /// Returns `false` when nothing existed to delete.
    async fn delete_whisper(&self, id: Uuid) -> DomainResult<bool>;

    async fn set_whisper_flagged(&self, id: Uuid, flagged: bool) -> DomainResult<bool>;

    // ── Reply operations ────────────────────────────────────────────────

    async fn insert_reply(&self, reply: Reply) -> DomainResult<()>;

    async fn get_reply(&self, id: Uuid) -> DomainResult<Option<Reply>>;

    /// Visible (non-buried, non-flagged) replies, oldest first.
    async fn replies_for(&self, whisper_id: Uuid) -> DomainResult<Vec<Reply>>;

    async fn delete_reply(&self, id: Uuid) -> DomainResult<bool>;

    async fn set_reply_flagged(&self, id: Uuid, flagged: bool) -> DomainResult<bool>;

    // ── Vote ledger ─────────────────────────────────────────────────────

    /// The existing vote for one (content, identity) pair, if any.
    async fn find_vote(
        &self,
        content_type: ContentType,
        content_id: Uuid,
        ip_hash: &str,
    ) -> DomainResult<Option<Vote>>;

    /// Applies one state-machine transition and recounts the target's
    /// tallies, atomically. Burial is monotonic: once set it survives the
    /// downvote count later dropping below the threshold.
    async fn apply_vote_transition(
        &self,
        content_type: ContentType,
        content_id: Uuid,
        ip_hash: &str,
        transition: VoteTransition,
    ) -> DomainResult<VoteTally>;

    // ── Moderation queue ────────────────────────────────────────────────

    async fn insert_flag(&self, flag: Flag) -> DomainResult<()>;

    /// Every flag on record, joined with its target content.
    async fn list_flagged(&self) -> DomainResult<Vec<FlaggedItem>>;

    // ── Tag operations ──────────────────────────────────────────────────

    async fn list_mood_tags(&self) -> DomainResult<Vec<MoodTag>>;
    async fn list_topic_tags(&self) -> DomainResult<Vec<TopicTag>>;
    async fn insert_mood_tag(&self, tag: MoodTag) -> DomainResult<()>;
    async fn insert_topic_tag(&self, tag: TopicTag) -> DomainResult<()>;
    async fn delete_mood_tag(&self, id: Uuid) -> DomainResult<bool>;
    async fn delete_topic_tag(&self, id: Uuid) -> DomainResult<bool>;

    // ── Theme operations ────────────────────────────────────────────────

    async fn list_themes(&self) -> DomainResult<Vec<Theme>>;

    /// The theme whose `[start_date, end_date]` window contains `now` and
    /// which is active, most recent `start_date` winning ties. Derived per
    /// request; never cached.
    async fn current_theme(&self, now: DateTime<Utc>) -> DomainResult<Option<Theme>>;

    async fn get_theme(&self, id: Uuid) -> DomainResult<Option<Theme>>;
    async fn insert_theme(&self, theme: Theme) -> DomainResult<()>;
    async fn update_theme(&self, id: Uuid, patch: ThemePatch) -> DomainResult<bool>;
    async fn delete_theme(&self, id: Uuid) -> DomainResult<bool>;

    // ── Admin audit log ─────────────────────────────────────────────────

    async fn append_admin_action(&self, action: AdminAction) -> DomainResult<()>;

    /// Audit trail, newest first. Used by tests and audit tooling only.
    async fn list_admin_actions(&self) -> DomainResult<Vec<AdminAction>>;

    /// Aggregate counters for the admin dashboard. `now` anchors the
    /// "today" cutoff so the query stays a pure function of request time.
    async fn stats(&self, now: DateTime<Utc>) -> DomainResult<BoardStats>;
}
