//! # Vote Ledger
//!
//! One vote per (content, identity) pair with toggle/switch semantics:
//!
//! - no prior vote          → insert a ledger row
//! - same type repeated     → delete the row (toggle-off)
//! - opposite type          → delete the old row, insert the new one
//!
//! The service reads the pair's current state and picks the transition; the
//! store applies the ledger mutation, the recount and the burial check in
//! one transaction, so counters never drift from ledger rows. Votes from
//! different identities on the same content are independent.

use std::sync::Arc;

use domains::{
    ContentType, DomainError, DomainResult, VoteReceipt, VoteState, VoteTransition, VoteType,
    WhisperStore,
};
use tracing::debug;
use uuid::Uuid;

use crate::identity::IdentityHasher;

#[derive(Clone)]
pub struct VoteService {
    store: Arc<dyn WhisperStore>,
    hasher: Arc<IdentityHasher>,
}

impl VoteService {
    pub fn new(store: Arc<dyn WhisperStore>, hasher: Arc<IdentityHasher>) -> Self {
        Self { store, hasher }
    }

    /// Runs one step of the vote state machine for the caller's identity and
    /// returns the resulting standing plus fresh tallies.
    pub async fn cast(
        &self,
        content_type: ContentType,
        content_id: Uuid,
        vote_type: VoteType,
        source_addr: &str,
    ) -> DomainResult<VoteReceipt> {
        self.ensure_target(content_type, content_id).await?;

        let ip_hash = self.hasher.hash(source_addr);
        let existing = self
            .store
            .find_vote(content_type, content_id, &ip_hash)
            .await?;

        let (transition, state) = match existing {
            None => (VoteTransition::Cast(vote_type), VoteState::from(vote_type)),
            Some(v) if v.vote_type == vote_type => (VoteTransition::Retract, VoteState::None),
            Some(_) => (VoteTransition::Switch(vote_type), VoteState::from(vote_type)),
        };

        let tally = self
            .store
            .apply_vote_transition(content_type, content_id, &ip_hash, transition)
            .await?;

        debug!(
            content = content_type.as_str(),
            %content_id,
            vote = vote_type.as_str(),
            ?transition,
            upvotes = tally.upvotes,
            downvotes = tally.downvotes,
            buried = tally.buried,
            "vote applied"
        );
        Ok(VoteReceipt { state, tally })
    }

    async fn ensure_target(
        &self,
        content_type: ContentType,
        content_id: Uuid,
    ) -> DomainResult<()> {
        let exists = match content_type {
            ContentType::Whisper => self.store.whisper_exists(content_id).await?,
            ContentType::Reply => self.store.get_reply(content_id).await?.is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(DomainError::not_found(
                match content_type {
                    ContentType::Whisper => "whisper",
                    ContentType::Reply => "reply",
                },
                content_id,
            ))
        }
    }
}
