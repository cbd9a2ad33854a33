//! Schema bootstrap. Idempotent; runs at startup and at the head of every
//! test against a fresh in-memory database.

use sqlx::sqlite::SqlitePool;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS mood_tags (
    id          BLOB PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS topic_tags (
    id          BLOB PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS themes (
    id          BLOB PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT,
    start_date  TEXT NOT NULL,
    end_date    TEXT NOT NULL,
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS whispers (
    id           BLOB PRIMARY KEY,
    text         TEXT NOT NULL,
    nickname     TEXT,
    mood_tag_id  BLOB REFERENCES mood_tags(id) ON DELETE SET NULL,
    topic_tag_id BLOB REFERENCES topic_tags(id) ON DELETE SET NULL,
    theme_id     BLOB REFERENCES themes(id) ON DELETE SET NULL,
    upvotes      INTEGER NOT NULL DEFAULT 0,
    downvotes    INTEGER NOT NULL DEFAULT 0,
    buried       INTEGER NOT NULL DEFAULT 0,
    flagged      INTEGER NOT NULL DEFAULT 0,
    ip_hash      TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS replies (
    id         BLOB PRIMARY KEY,
    whisper_id BLOB NOT NULL REFERENCES whispers(id) ON DELETE CASCADE,
    text       TEXT NOT NULL,
    nickname   TEXT,
    upvotes    INTEGER NOT NULL DEFAULT 0,
    downvotes  INTEGER NOT NULL DEFAULT 0,
    buried     INTEGER NOT NULL DEFAULT 0,
    flagged    INTEGER NOT NULL DEFAULT 0,
    ip_hash    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS votes (
    id           BLOB PRIMARY KEY,
    content_type TEXT NOT NULL,
    content_id   BLOB NOT NULL,
    vote_type    TEXT NOT NULL,
    ip_hash      TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flags (
    id           BLOB PRIMARY KEY,
    content_type TEXT NOT NULL,
    content_id   BLOB NOT NULL,
    reason       TEXT NOT NULL,
    ip_hash      TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_actions (
    id            BLOB PRIMARY KEY,
    admin_user_id TEXT NOT NULL,
    action_type   TEXT NOT NULL,
    target_type   TEXT,
    target_id     BLOB,
    details       TEXT,
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_replies_whisper  ON replies(whisper_id);
CREATE INDEX IF NOT EXISTS idx_votes_lookup     ON votes(content_type, content_id, ip_hash);
CREATE INDEX IF NOT EXISTS idx_flags_content    ON flags(content_type, content_id);
CREATE INDEX IF NOT EXISTS idx_whispers_created ON whispers(created_at);
"#;

/// Creates all tables and indexes if missing.
pub async fn ensure_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}
