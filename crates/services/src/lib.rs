//! # services
//!
//! The use-case layer of Whispering Walls: identity hashing, content
//! submission and listing, the vote state machine, the moderation queue and
//! tag/theme administration. Everything here talks to storage through the
//! `WhisperStore` port and carries no I/O of its own.

pub mod catalog;
pub mod identity;
pub mod moderation;
pub mod votes;
pub mod whispers;

pub use catalog::CatalogService;
pub use identity::IdentityHasher;
pub use moderation::ModerationService;
pub use votes::VoteService;
pub use whispers::WhisperService;
