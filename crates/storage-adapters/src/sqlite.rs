//! SQLite implementation of the `WhisperStore` port.
//!
//! Uuids are stored as 16-byte blobs, enums as their lowercase wire names.
//! Vote transitions run as a single transaction: ledger mutation, recount
//! from ledger rows, burial check. Burial is monotonic — the downvote count
//! crossing back under the threshold never clears it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    AdminAction, BoardStats, ContentType, DomainError, DomainResult, Flag, FlaggedItem, MoodTag,
    Reply, Theme, ThemePatch, TopicTag, Vote, VoteTally, VoteTransition, VoteType, Whisper,
    WhisperFilters, WhisperStore, WhisperView, DOWNVOTE_BURY_THRESHOLD,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

pub struct SqliteWhisperStore {
    pool: SqlitePool,
}

impl SqliteWhisperStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

fn opt_uuid_to_blob(id: Option<Uuid>) -> Option<Vec<u8>> {
    id.map(uuid_to_blob)
}

fn opt_blob_to_uuid(blob: Option<Vec<u8>>) -> Option<Uuid> {
    blob.map(|b| blob_to_uuid(&b))
}

fn db_err(e: sqlx::Error) -> DomainError {
    if let Some(db) = e.as_database_error() {
        if db.kind() == sqlx::error::ErrorKind::UniqueViolation {
            return DomainError::Conflict("a record with that name already exists".into());
        }
    }
    DomainError::Internal(e.to_string())
}

fn parse_content_type(s: &str) -> DomainResult<ContentType> {
    ContentType::parse(s)
        .ok_or_else(|| DomainError::Internal(format!("corrupt content_type value: {s}")))
}

fn parse_vote_type(s: &str) -> DomainResult<VoteType> {
    VoteType::parse(s).ok_or_else(|| DomainError::Internal(format!("corrupt vote_type value: {s}")))
}

fn whisper_from_row(row: &SqliteRow) -> Whisper {
    Whisper {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id")),
        text: row.get("text"),
        nickname: row.get("nickname"),
        mood_tag_id: opt_blob_to_uuid(row.get("mood_tag_id")),
        topic_tag_id: opt_blob_to_uuid(row.get("topic_tag_id")),
        theme_id: opt_blob_to_uuid(row.get("theme_id")),
        upvotes: row.get("upvotes"),
        downvotes: row.get("downvotes"),
        buried: row.get("buried"),
        flagged: row.get("flagged"),
        ip_hash: row.get("ip_hash"),
        created_at: row.get("created_at"),
    }
}

fn reply_from_row(row: &SqliteRow) -> Reply {
    Reply {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id")),
        whisper_id: blob_to_uuid(&row.get::<Vec<u8>, _>("whisper_id")),
        text: row.get("text"),
        nickname: row.get("nickname"),
        upvotes: row.get("upvotes"),
        downvotes: row.get("downvotes"),
        buried: row.get("buried"),
        flagged: row.get("flagged"),
        ip_hash: row.get("ip_hash"),
        created_at: row.get("created_at"),
    }
}

fn mood_tag_from_row(row: &SqliteRow) -> MoodTag {
    MoodTag {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id")),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

fn topic_tag_from_row(row: &SqliteRow) -> TopicTag {
    TopicTag {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id")),
        name: row.get("name"),
        description: row.get("description"),
        created_at: row.get("created_at"),
    }
}

fn theme_from_row(row: &SqliteRow) -> Theme {
    Theme {
        id: blob_to_uuid(&row.get::<Vec<u8>, _>("id")),
        title: row.get("title"),
        description: row.get("description"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

impl SqliteWhisperStore {
    async fn fetch_whisper_raw(&self, id: Uuid) -> DomainResult<Option<Whisper>> {
        let row = sqlx::query("SELECT * FROM whispers WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(whisper_from_row))
    }

    async fn fetch_mood_tag(&self, id: Uuid) -> DomainResult<Option<MoodTag>> {
        let row = sqlx::query("SELECT * FROM mood_tags WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(mood_tag_from_row))
    }

    async fn fetch_topic_tag(&self, id: Uuid) -> DomainResult<Option<TopicTag>> {
        let row = sqlx::query("SELECT * FROM topic_tags WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(topic_tag_from_row))
    }

    async fn fetch_theme(&self, id: Uuid) -> DomainResult<Option<Theme>> {
        let row = sqlx::query("SELECT * FROM themes WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(theme_from_row))
    }

    async fn resolve_view(&self, whisper: Whisper, reply_count: i64) -> DomainResult<WhisperView> {
        let mood_tag = match whisper.mood_tag_id {
            Some(id) => self.fetch_mood_tag(id).await?,
            None => None,
        };
        let topic_tag = match whisper.topic_tag_id {
            Some(id) => self.fetch_topic_tag(id).await?,
            None => None,
        };
        let theme = match whisper.theme_id {
            Some(id) => self.fetch_theme(id).await?,
            None => None,
        };
        Ok(WhisperView {
            whisper,
            mood_tag,
            topic_tag,
            theme,
            reply_count,
            replies: Vec::new(),
        })
    }
}

#[async_trait]
impl WhisperStore for SqliteWhisperStore {
    async fn insert_whisper(&self, w: Whisper) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO whispers \
             (id, text, nickname, mood_tag_id, topic_tag_id, theme_id, upvotes, downvotes, buried, flagged, ip_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(w.id))
        .bind(w.text)
        .bind(w.nickname)
        .bind(opt_uuid_to_blob(w.mood_tag_id))
        .bind(opt_uuid_to_blob(w.topic_tag_id))
        .bind(opt_uuid_to_blob(w.theme_id))
        .bind(w.upvotes)
        .bind(w.downvotes)
        .bind(w.buried)
        .bind(w.flagged)
        .bind(w.ip_hash)
        .bind(w.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_whispers(&self, filters: WhisperFilters) -> DomainResult<Vec<WhisperView>> {
        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT w.*, \
             (SELECT COUNT(*) FROM replies r WHERE r.whisper_id = w.id) AS reply_count \
             FROM whispers w WHERE w.buried = 0 AND w.flagged = 0",
        );
        if let Some(id) = filters.mood_tag_id {
            qb.push(" AND w.mood_tag_id = ").push_bind(uuid_to_blob(id));
        }
        if let Some(id) = filters.topic_tag_id {
            qb.push(" AND w.topic_tag_id = ").push_bind(uuid_to_blob(id));
        }
        if let Some(id) = filters.theme_id {
            qb.push(" AND w.theme_id = ").push_bind(uuid_to_blob(id));
        }
        if let Some(search) = &filters.search {
            qb.push(" AND LOWER(w.text) LIKE ")
                .push_bind(format!("%{}%", search.to_lowercase()));
        }
        // Equal sort keys fall back to newest-first in every order.
        match filters.sort {
            domains::SortOrder::Recent => qb.push(" ORDER BY w.created_at DESC"),
            domains::SortOrder::Popular => {
                qb.push(" ORDER BY (w.upvotes - w.downvotes) DESC, w.created_at DESC")
            }
            domains::SortOrder::Discussed => {
                qb.push(" ORDER BY reply_count DESC, w.created_at DESC")
            }
        };
        qb.push(" LIMIT ").push_bind(filters.limit);
        qb.push(" OFFSET ").push_bind(filters.offset);

        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_err)?;

        let mut views = Vec::with_capacity(rows.len());
        for row in &rows {
            let reply_count: i64 = row.get("reply_count");
            views.push(self.resolve_view(whisper_from_row(row), reply_count).await?);
        }
        Ok(views)
    }

    async fn get_whisper(&self, id: Uuid) -> DomainResult<Option<WhisperView>> {
        let Some(whisper) = self.fetch_whisper_raw(id).await? else {
            return Ok(None);
        };
        let replies = self.replies_for(id).await?;
        let mut view = self.resolve_view(whisper, replies.len() as i64).await?;
        view.replies = replies;
        Ok(Some(view))
    }

    async fn whisper_exists(&self, id: Uuid) -> DomainResult<bool> {
        let row = sqlx::query("SELECT 1 FROM whispers WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.is_some())
    }

    async fn delete_whisper(&self, id: Uuid) -> DomainResult<bool> {
        // Replies go with it via the ON DELETE CASCADE constraint.
        let result = sqlx::query("DELETE FROM whispers WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_whisper_flagged(&self, id: Uuid, flagged: bool) -> DomainResult<bool> {
        let result = sqlx::query("UPDATE whispers SET flagged = ? WHERE id = ?")
            .bind(flagged)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_reply(&self, r: Reply) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO replies \
             (id, whisper_id, text, nickname, upvotes, downvotes, buried, flagged, ip_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(r.id))
        .bind(uuid_to_blob(r.whisper_id))
        .bind(r.text)
        .bind(r.nickname)
        .bind(r.upvotes)
        .bind(r.downvotes)
        .bind(r.buried)
        .bind(r.flagged)
        .bind(r.ip_hash)
        .bind(r.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_reply(&self, id: Uuid) -> DomainResult<Option<Reply>> {
        let row = sqlx::query("SELECT * FROM replies WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(row.as_ref().map(reply_from_row))
    }

    async fn replies_for(&self, whisper_id: Uuid) -> DomainResult<Vec<Reply>> {
        let rows = sqlx::query(
            "SELECT * FROM replies \
             WHERE whisper_id = ? AND buried = 0 AND flagged = 0 \
             ORDER BY created_at ASC",
        )
        .bind(uuid_to_blob(whisper_id))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.iter().map(reply_from_row).collect())
    }

    async fn delete_reply(&self, id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM replies WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_reply_flagged(&self, id: Uuid, flagged: bool) -> DomainResult<bool> {
        let result = sqlx::query("UPDATE replies SET flagged = ? WHERE id = ?")
            .bind(flagged)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_vote(
        &self,
        content_type: ContentType,
        content_id: Uuid,
        ip_hash: &str,
    ) -> DomainResult<Option<Vote>> {
        let row = sqlx::query(
            "SELECT * FROM votes WHERE content_type = ? AND content_id = ? AND ip_hash = ?",
        )
        .bind(content_type.as_str())
        .bind(uuid_to_blob(content_id))
        .bind(ip_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            None => Ok(None),
            Some(row) => Ok(Some(Vote {
                id: blob_to_uuid(&row.get::<Vec<u8>, _>("id")),
                content_type: parse_content_type(row.get("content_type"))?,
                content_id: blob_to_uuid(&row.get::<Vec<u8>, _>("content_id")),
                vote_type: parse_vote_type(row.get("vote_type"))?,
                ip_hash: row.get("ip_hash"),
                created_at: row.get("created_at"),
            })),
        }
    }

    /// Ledger mutation, recount and burial check in one transaction, so a
    /// failure at any step leaves counters consistent with ledger rows.
    async fn apply_vote_transition(
        &self,
        content_type: ContentType,
        content_id: Uuid,
        ip_hash: &str,
        transition: VoteTransition,
    ) -> DomainResult<VoteTally> {
        let table = match content_type {
            ContentType::Whisper => "whispers",
            ContentType::Reply => "replies",
        };
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let delete_sql =
            "DELETE FROM votes WHERE content_type = ? AND content_id = ? AND ip_hash = ?";
        let insert_sql = "INSERT INTO votes (id, content_type, content_id, vote_type, ip_hash, created_at) \
                          VALUES (?, ?, ?, ?, ?, ?)";
        let insert = |vote_type: VoteType| {
            sqlx::query(insert_sql)
                .bind(uuid_to_blob(Uuid::new_v4()))
                .bind(content_type.as_str())
                .bind(uuid_to_blob(content_id))
                .bind(vote_type.as_str())
                .bind(ip_hash.to_string())
                .bind(Utc::now())
        };

        match transition {
            VoteTransition::Cast(vote_type) => {
                insert(vote_type).execute(&mut *tx).await.map_err(db_err)?;
            }
            VoteTransition::Retract => {
                sqlx::query(delete_sql)
                    .bind(content_type.as_str())
                    .bind(uuid_to_blob(content_id))
                    .bind(ip_hash)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
            }
            VoteTransition::Switch(vote_type) => {
                sqlx::query(delete_sql)
                    .bind(content_type.as_str())
                    .bind(uuid_to_blob(content_id))
                    .bind(ip_hash)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
                insert(vote_type).execute(&mut *tx).await.map_err(db_err)?;
            }
        }

        // Counters are derived from a fresh count over ledger rows, never
        // incremented, so concurrent votes from other identities survive.
        let counts = sqlx::query(
            "SELECT \
             COALESCE(SUM(CASE WHEN vote_type = 'up' THEN 1 ELSE 0 END), 0) AS ups, \
             COALESCE(SUM(CASE WHEN vote_type = 'down' THEN 1 ELSE 0 END), 0) AS downs \
             FROM votes WHERE content_type = ? AND content_id = ?",
        )
        .bind(content_type.as_str())
        .bind(uuid_to_blob(content_id))
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        let upvotes: i64 = counts.get("ups");
        let downvotes: i64 = counts.get("downs");

        let updated = sqlx::query(&format!(
            "UPDATE {table} SET upvotes = ?, downvotes = ?, \
             buried = CASE WHEN ? >= ? THEN 1 ELSE buried END \
             WHERE id = ?"
        ))
        .bind(upvotes)
        .bind(downvotes)
        .bind(downvotes)
        .bind(DOWNVOTE_BURY_THRESHOLD)
        .bind(uuid_to_blob(content_id))
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
        if updated.rows_affected() == 0 {
            // Target vanished between the service's existence check and
            // this transaction; roll everything back.
            tx.rollback().await.map_err(db_err)?;
            return Err(DomainError::not_found(content_type.as_str(), content_id));
        }

        let row = sqlx::query(&format!("SELECT buried FROM {table} WHERE id = ?"))
            .bind(uuid_to_blob(content_id))
            .fetch_one(&mut *tx)
            .await
            .map_err(db_err)?;
        let buried: bool = row.get("buried");

        tx.commit().await.map_err(db_err)?;
        Ok(VoteTally {
            upvotes,
            downvotes,
            buried,
        })
    }

    async fn insert_flag(&self, f: Flag) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO flags (id, content_type, content_id, reason, ip_hash, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(f.id))
        .bind(f.content_type.as_str())
        .bind(uuid_to_blob(f.content_id))
        .bind(f.reason)
        .bind(f.ip_hash)
        .bind(f.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_flagged(&self) -> DomainResult<Vec<FlaggedItem>> {
        let rows = sqlx::query("SELECT * FROM flags ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let flag = Flag {
                id: blob_to_uuid(&row.get::<Vec<u8>, _>("id")),
                content_type: parse_content_type(row.get("content_type"))?,
                content_id: blob_to_uuid(&row.get::<Vec<u8>, _>("content_id")),
                reason: row.get("reason"),
                ip_hash: row.get("ip_hash"),
                created_at: row.get("created_at"),
            };
            let (whisper, reply) = match flag.content_type {
                ContentType::Whisper => (self.fetch_whisper_raw(flag.content_id).await?, None),
                ContentType::Reply => (None, self.get_reply(flag.content_id).await?),
            };
            items.push(FlaggedItem {
                flag,
                whisper,
                reply,
            });
        }
        Ok(items)
    }

    async fn list_mood_tags(&self) -> DomainResult<Vec<MoodTag>> {
        let rows = sqlx::query("SELECT * FROM mood_tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(mood_tag_from_row).collect())
    }

    async fn list_topic_tags(&self) -> DomainResult<Vec<TopicTag>> {
        let rows = sqlx::query("SELECT * FROM topic_tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(topic_tag_from_row).collect())
    }

    async fn insert_mood_tag(&self, tag: MoodTag) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO mood_tags (id, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(tag.id))
        .bind(tag.name)
        .bind(tag.description)
        .bind(tag.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn insert_topic_tag(&self, tag: TopicTag) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO topic_tags (id, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(tag.id))
        .bind(tag.name)
        .bind(tag.description)
        .bind(tag.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn delete_mood_tag(&self, id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM mood_tags WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_topic_tag(&self, id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM topic_tags WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_themes(&self) -> DomainResult<Vec<Theme>> {
        let rows = sqlx::query("SELECT * FROM themes ORDER BY start_date DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(rows.iter().map(theme_from_row).collect())
    }

    async fn current_theme(&self, now: DateTime<Utc>) -> DomainResult<Option<Theme>> {
        let row = sqlx::query(
            "SELECT * FROM themes \
             WHERE is_active = 1 AND start_date <= ? AND end_date >= ? \
             ORDER BY start_date DESC LIMIT 1",
        )
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.as_ref().map(theme_from_row))
    }

    async fn get_theme(&self, id: Uuid) -> DomainResult<Option<Theme>> {
        self.fetch_theme(id).await
    }

    async fn insert_theme(&self, theme: Theme) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO themes (id, title, description, start_date, end_date, is_active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(theme.id))
        .bind(theme.title)
        .bind(theme.description)
        .bind(theme.start_date)
        .bind(theme.end_date)
        .bind(theme.is_active)
        .bind(theme.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update_theme(&self, id: Uuid, patch: ThemePatch) -> DomainResult<bool> {
        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE themes SET ");
        let mut assignments = qb.separated(", ");
        let mut any = false;
        if let Some(title) = patch.title {
            assignments.push("title = ").push_bind_unseparated(title);
            any = true;
        }
        if let Some(description) = patch.description {
            assignments
                .push("description = ")
                .push_bind_unseparated(description);
            any = true;
        }
        if let Some(start_date) = patch.start_date {
            assignments
                .push("start_date = ")
                .push_bind_unseparated(start_date);
            any = true;
        }
        if let Some(end_date) = patch.end_date {
            assignments
                .push("end_date = ")
                .push_bind_unseparated(end_date);
            any = true;
        }
        if let Some(is_active) = patch.is_active {
            assignments
                .push("is_active = ")
                .push_bind_unseparated(is_active);
            any = true;
        }
        if !any {
            let row = sqlx::query("SELECT 1 FROM themes WHERE id = ?")
                .bind(uuid_to_blob(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
            return Ok(row.is_some());
        }
        qb.push(" WHERE id = ").push_bind(uuid_to_blob(id));
        let result = qb.build().execute(&self.pool).await.map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_theme(&self, id: Uuid) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM themes WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_admin_action(&self, action: AdminAction) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO admin_actions \
             (id, admin_user_id, action_type, target_type, target_id, details, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(action.id))
        .bind(action.admin_user_id)
        .bind(action.action_type)
        .bind(action.target_type.map(|t| t.as_str()))
        .bind(opt_uuid_to_blob(action.target_id))
        .bind(action.details)
        .bind(action.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn list_admin_actions(&self) -> DomainResult<Vec<AdminAction>> {
        let rows = sqlx::query("SELECT * FROM admin_actions ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut actions = Vec::with_capacity(rows.len());
        for row in &rows {
            let target_type = match row.get::<Option<String>, _>("target_type") {
                Some(s) => Some(parse_content_type(&s)?),
                None => None,
            };
            actions.push(AdminAction {
                id: blob_to_uuid(&row.get::<Vec<u8>, _>("id")),
                admin_user_id: row.get("admin_user_id"),
                action_type: row.get("action_type"),
                target_type,
                target_id: opt_blob_to_uuid(row.get("target_id")),
                details: row.get("details"),
                created_at: row.get("created_at"),
            });
        }
        Ok(actions)
    }

    async fn stats(&self, now: DateTime<Utc>) -> DomainResult<BoardStats> {
        let scalar = |sql: &'static str| async move {
            let row = sqlx::query(sql)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;
            Ok::<i64, DomainError>(row.get::<i64, _>(0))
        };

        let total_whispers = scalar("SELECT COUNT(*) FROM whispers").await?;
        let total_replies = scalar("SELECT COUNT(*) FROM replies").await?;
        let flagged_content = scalar("SELECT COUNT(*) FROM flags").await?;
        let active_themes = scalar("SELECT COUNT(*) FROM themes WHERE is_active = 1").await?;

        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always a valid time")
            .and_utc();
        let row = sqlx::query("SELECT COUNT(*) FROM whispers WHERE created_at >= ?")
            .bind(today_start)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        let today_whispers: i64 = row.get(0);

        Ok(BoardStats {
            total_whispers,
            total_replies,
            flagged_content,
            active_themes,
            today_whispers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect, ensure_schema};

    async fn store() -> SqliteWhisperStore {
        let pool = connect("sqlite::memory:").await.unwrap();
        ensure_schema(&pool).await.unwrap();
        SqliteWhisperStore::new(pool)
    }

    fn whisper(text: &str) -> Whisper {
        Whisper {
            id: Uuid::new_v4(),
            text: text.to_string(),
            nickname: None,
            mood_tag_id: None,
            topic_tag_id: None,
            theme_id: None,
            upvotes: 0,
            downvotes: 0,
            buried: false,
            flagged: false,
            ip_hash: "hash-a".into(),
            created_at: Utc::now(),
        }
    }

    fn reply(whisper_id: Uuid, text: &str) -> Reply {
        Reply {
            id: Uuid::new_v4(),
            whisper_id,
            text: text.to_string(),
            nickname: None,
            upvotes: 0,
            downvotes: 0,
            buried: false,
            flagged: false,
            ip_hash: "hash-a".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let store = store().await;
        let w = whisper("hello walls");
        store.insert_whisper(w.clone()).await.unwrap();

        let view = store.get_whisper(w.id).await.unwrap().unwrap();
        assert_eq!(view.whisper.id, w.id);
        assert_eq!(view.whisper.text, "hello walls");
        assert_eq!(view.reply_count, 0);
    }

    #[tokio::test]
    async fn vote_transition_recounts_inside_one_transaction() {
        let store = store().await;
        let w = whisper("vote on me");
        store.insert_whisper(w.clone()).await.unwrap();

        let tally = store
            .apply_vote_transition(
                ContentType::Whisper,
                w.id,
                "voter-1",
                VoteTransition::Cast(VoteType::Up),
            )
            .await
            .unwrap();
        assert_eq!(tally.upvotes, 1);
        assert_eq!(tally.downvotes, 0);

        let tally = store
            .apply_vote_transition(
                ContentType::Whisper,
                w.id,
                "voter-1",
                VoteTransition::Retract,
            )
            .await
            .unwrap();
        assert_eq!(tally.upvotes, 0);
    }

    #[tokio::test]
    async fn deleting_a_whisper_cascades_to_replies() {
        let store = store().await;
        let w = whisper("parent");
        store.insert_whisper(w.clone()).await.unwrap();
        let r = reply(w.id, "child");
        store.insert_reply(r.clone()).await.unwrap();

        assert!(store.delete_whisper(w.id).await.unwrap());
        assert!(store.get_reply(r.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_tag_names_conflict() {
        let store = store().await;
        let tag = MoodTag {
            id: Uuid::new_v4(),
            name: "Hope".into(),
            description: None,
            created_at: Utc::now(),
        };
        store.insert_mood_tag(tag.clone()).await.unwrap();

        let dup = MoodTag {
            id: Uuid::new_v4(),
            ..tag
        };
        let res = store.insert_mood_tag(dup).await;
        assert!(matches!(res, Err(DomainError::Conflict(_))));
    }
}
