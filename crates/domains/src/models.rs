//! # Domain Models
//!
//! These structs represent the core entities of Whispering Walls.
//! Wire names are camelCase to match the JSON payloads the frontend speaks;
//! `ip_hash` is never serialized — it exists only for vote/flag deduplication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Downvote count at which content is buried (suppressed from public
/// listings). Burial is one-way: it is never cleared automatically even if
/// the tally later drops below the threshold.
pub const DOWNVOTE_BURY_THRESHOLD: i64 = 10;

/// Maximum body length for whispers and replies, in characters.
pub const MAX_TEXT_LEN: usize = 200;

/// Maximum length for the optional display nickname.
pub const MAX_NICKNAME_LEN: usize = 50;

/// Discriminates the two kinds of user content a vote or flag can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Whisper,
    Reply,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Whisper => "whisper",
            ContentType::Reply => "reply",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "whisper" => Some(ContentType::Whisper),
            "reply" => Some(ContentType::Reply),
            _ => None,
        }
    }
}

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Up,
    Down,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteType::Up => "up",
            VoteType::Down => "down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(VoteType::Up),
            "down" => Some(VoteType::Down),
            _ => None,
        }
    }
}

/// Sort orders for the public whisper listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Newest first (default).
    #[default]
    Recent,
    /// Highest score (upvotes − downvotes) first.
    Popular,
    /// Most replies first.
    Discussed,
}

/// A top-level anonymous post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Whisper {
    pub id: Uuid,
    pub text: String,
    pub nickname: Option<String>,
    pub mood_tag_id: Option<Uuid>,
    pub topic_tag_id: Option<Uuid>,
    pub theme_id: Option<Uuid>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub buried: bool,
    pub flagged: bool,
    /// Pseudonymous submitter identity; internal only.
    #[serde(skip_serializing, default)]
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A response attached to exactly one whisper. Structurally a whisper minus
/// the tag/theme references plus the required parent id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: Uuid,
    pub whisper_id: Uuid,
    pub text: String,
    pub nickname: Option<String>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub buried: bool,
    pub flagged: bool,
    #[serde(skip_serializing, default)]
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

/// An emotion label whispers may carry (e.g. "Hope", "Regret").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodTag {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A subject label whispers may carry (e.g. "Work", "Dreams").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTag {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An administrator-defined, time-windowed prompt whispers may join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Theme {
    /// Whether this theme's active window contains `now`.
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && self.end_date >= now
    }
}

/// One recorded vote. At most one exists per (content, identity) pair; the
/// ledger is mutated by delete/insert, never updated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub content_type: ContentType,
    pub content_id: Uuid,
    pub vote_type: VoteType,
    #[serde(skip_serializing, default)]
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A user-submitted report against a piece of content. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub id: Uuid,
    pub content_type: ContentType,
    pub content_id: Uuid,
    pub reason: String,
    #[serde(skip_serializing, default)]
    pub ip_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit record of an administrative mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAction {
    pub id: Uuid,
    pub admin_user_id: String,
    pub action_type: String,
    pub target_type: Option<ContentType>,
    pub target_id: Option<Uuid>,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A whisper with its references resolved for presentation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhisperView {
    #[serde(flatten)]
    pub whisper: Whisper,
    pub mood_tag: Option<MoodTag>,
    pub topic_tag: Option<TopicTag>,
    pub theme: Option<Theme>,
    pub reply_count: i64,
    /// Visible replies, oldest first. Populated by single-whisper fetches;
    /// left empty by listings.
    pub replies: Vec<Reply>,
}

/// A flag joined with whatever content it targets. The content side is
/// `None` when the target has since been deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlaggedItem {
    #[serde(flatten)]
    pub flag: Flag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whisper: Option<Whisper>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<Reply>,
}

/// Filter/sort/pagination parameters for the public listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhisperFilters {
    pub mood_tag_id: Option<Uuid>,
    pub topic_tag_id: Option<Uuid>,
    pub theme_id: Option<Uuid>,
    pub sort: SortOrder,
    /// Case-insensitive substring match on the whisper text.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Ledger mutation chosen by the vote state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No prior vote: insert a new ledger row.
    Cast(VoteType),
    /// Same type repeated: delete the ledger row (toggle-off).
    Retract,
    /// Opposite type: delete the old row, insert the new one.
    Switch(VoteType),
}

/// Post-transition vote tallies for a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub upvotes: i64,
    pub downvotes: i64,
    pub buried: bool,
}

/// The voter's standing on a piece of content after a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    None,
    Up,
    Down,
}

impl From<VoteType> for VoteState {
    fn from(v: VoteType) -> Self {
        match v {
            VoteType::Up => VoteState::Up,
            VoteType::Down => VoteState::Down,
        }
    }
}

/// Outcome of a vote cast returned to the caller.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub state: VoteState,
    #[serde(flatten)]
    pub tally: VoteTally,
}

/// Aggregate counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    pub total_whispers: i64,
    pub total_replies: i64,
    pub flagged_content: i64,
    pub active_themes: i64,
    pub today_whispers: i64,
}

/// Fields accepted when creating a whisper.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWhisper {
    pub text: String,
    pub nickname: Option<String>,
    pub mood_tag_id: Option<Uuid>,
    pub topic_tag_id: Option<Uuid>,
    pub theme_id: Option<Uuid>,
}

/// Fields accepted when creating a reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReply {
    pub text: String,
    pub nickname: Option<String>,
}

/// Fields accepted when creating a mood or topic tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTag {
    pub name: String,
    pub description: Option<String>,
}

/// Fields accepted when creating a theme.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTheme {
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Partial update for a theme; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}
