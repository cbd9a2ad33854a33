//! Tag and theme administration plus their public read paths.
//!
//! The "current theme" is a derived query over the request clock, never a
//! cached singleton, so a theme window expiring needs no invalidation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    DomainError, DomainResult, MoodTag, NewTag, NewTheme, Theme, ThemePatch, TopicTag,
    WhisperStore,
};
use tracing::info;
use uuid::Uuid;

use crate::moderation::admin_action;

/// Audit log action types written by this module.
pub mod action {
    pub const CREATE_MOOD_TAG: &str = "create_mood_tag";
    pub const CREATE_TOPIC_TAG: &str = "create_topic_tag";
    pub const DELETE_MOOD_TAG: &str = "delete_mood_tag";
    pub const DELETE_TOPIC_TAG: &str = "delete_topic_tag";
    pub const CREATE_THEME: &str = "create_theme";
    pub const UPDATE_THEME: &str = "update_theme";
    pub const DELETE_THEME: &str = "delete_theme";
}

const MAX_TAG_NAME_LEN: usize = 50;
const MAX_THEME_TITLE_LEN: usize = 200;

/// Default mood tags installed into an empty deployment.
const DEFAULT_MOODS: &[(&str, &str)] = &[
    ("Hope", "Feelings of optimism and expectation"),
    ("Regret", "Feelings of sadness or disappointment"),
    ("Fear", "Feelings of anxiety or worry"),
    ("Joy", "Feelings of happiness and delight"),
    ("Sadness", "Feelings of sorrow and melancholy"),
    ("Love", "Feelings of affection and care"),
    ("Anger", "Feelings of frustration and rage"),
];

/// Default topic tags installed into an empty deployment.
const DEFAULT_TOPICS: &[(&str, &str)] = &[
    ("Relationships", "Love, friendship, family dynamics"),
    ("Work", "Career, job experiences, workplace"),
    ("Family", "Family relationships and experiences"),
    ("Dreams", "Aspirations, goals, and ambitions"),
    ("Mental Health", "Emotional wellbeing and mental health"),
];

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn WhisperStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn WhisperStore>) -> Self {
        Self { store }
    }

    // ── Tags ────────────────────────────────────────────────────────────

    pub async fn mood_tags(&self) -> DomainResult<Vec<MoodTag>> {
        self.store.list_mood_tags().await
    }

    pub async fn topic_tags(&self) -> DomainResult<Vec<TopicTag>> {
        self.store.list_topic_tags().await
    }

    pub async fn create_mood_tag(
        &self,
        admin_user_id: &str,
        new: NewTag,
    ) -> DomainResult<MoodTag> {
        let (name, description) = validate_tag(new)?;
        let tag = MoodTag {
            id: Uuid::new_v4(),
            name,
            description,
            created_at: Utc::now(),
        };
        self.store.insert_mood_tag(tag.clone()).await?;
        self.log_tag(admin_user_id, action::CREATE_MOOD_TAG, &tag.name, tag.id)
            .await?;
        Ok(tag)
    }

    pub async fn create_topic_tag(
        &self,
        admin_user_id: &str,
        new: NewTag,
    ) -> DomainResult<TopicTag> {
        let (name, description) = validate_tag(new)?;
        let tag = TopicTag {
            id: Uuid::new_v4(),
            name,
            description,
            created_at: Utc::now(),
        };
        self.store.insert_topic_tag(tag.clone()).await?;
        self.log_tag(admin_user_id, action::CREATE_TOPIC_TAG, &tag.name, tag.id)
            .await?;
        Ok(tag)
    }

    pub async fn delete_mood_tag(&self, admin_user_id: &str, id: Uuid) -> DomainResult<bool> {
        let deleted = self.store.delete_mood_tag(id).await?;
        if deleted {
            self.log_tag(admin_user_id, action::DELETE_MOOD_TAG, "", id)
                .await?;
        }
        Ok(deleted)
    }

    pub async fn delete_topic_tag(&self, admin_user_id: &str, id: Uuid) -> DomainResult<bool> {
        let deleted = self.store.delete_topic_tag(id).await?;
        if deleted {
            self.log_tag(admin_user_id, action::DELETE_TOPIC_TAG, "", id)
                .await?;
        }
        Ok(deleted)
    }

    /// Installs the default mood/topic tags when the respective tables are
    /// empty. Runs at startup; a system action, so nothing is audited.
    pub async fn seed_default_tags(&self) -> DomainResult<()> {
        if self.store.list_mood_tags().await?.is_empty() {
            for (name, description) in DEFAULT_MOODS {
                self.store
                    .insert_mood_tag(MoodTag {
                        id: Uuid::new_v4(),
                        name: (*name).to_string(),
                        description: Some((*description).to_string()),
                        created_at: Utc::now(),
                    })
                    .await?;
            }
            info!(count = DEFAULT_MOODS.len(), "seeded default mood tags");
        }
        if self.store.list_topic_tags().await?.is_empty() {
            for (name, description) in DEFAULT_TOPICS {
                self.store
                    .insert_topic_tag(TopicTag {
                        id: Uuid::new_v4(),
                        name: (*name).to_string(),
                        description: Some((*description).to_string()),
                        created_at: Utc::now(),
                    })
                    .await?;
            }
            info!(count = DEFAULT_TOPICS.len(), "seeded default topic tags");
        }
        Ok(())
    }

    // ── Themes ──────────────────────────────────────────────────────────

    pub async fn themes(&self) -> DomainResult<Vec<Theme>> {
        self.store.list_themes().await
    }

    /// The active theme whose window contains `now`, if any.
    pub async fn current_theme(&self, now: DateTime<Utc>) -> DomainResult<Option<Theme>> {
        self.store.current_theme(now).await
    }

    pub async fn create_theme(&self, admin_user_id: &str, new: NewTheme) -> DomainResult<Theme> {
        let title = new.title.trim().to_string();
        validate_theme(&title, new.start_date, new.end_date)?;

        let theme = Theme {
            id: Uuid::new_v4(),
            title,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            is_active: new.is_active,
            created_at: Utc::now(),
        };
        self.store.insert_theme(theme.clone()).await?;
        self.store
            .append_admin_action(admin_action(
                admin_user_id,
                action::CREATE_THEME,
                None,
                Some(theme.id),
                Some(serde_json::json!({ "title": theme.title }).to_string()),
            ))
            .await?;
        Ok(theme)
    }

    /// Applies a partial update. The patch is merged onto the stored theme
    /// and the result revalidated, so a patch cannot smuggle in a window
    /// that `create_theme` would have rejected.
    pub async fn update_theme(
        &self,
        admin_user_id: &str,
        id: Uuid,
        patch: ThemePatch,
    ) -> DomainResult<bool> {
        let Some(current) = self.store.get_theme(id).await? else {
            return Ok(false);
        };
        let merged_title = patch
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or(&current.title)
            .to_string();
        let merged_start = patch.start_date.unwrap_or(current.start_date);
        let merged_end = patch.end_date.unwrap_or(current.end_date);
        validate_theme(&merged_title, merged_start, merged_end)?;

        let patch = ThemePatch {
            title: patch.title.map(|_| merged_title),
            ..patch
        };
        let updated = self.store.update_theme(id, patch).await?;
        if updated {
            self.store
                .append_admin_action(admin_action(
                    admin_user_id,
                    action::UPDATE_THEME,
                    None,
                    Some(id),
                    None,
                ))
                .await?;
        }
        Ok(updated)
    }

    pub async fn delete_theme(&self, admin_user_id: &str, id: Uuid) -> DomainResult<bool> {
        let deleted = self.store.delete_theme(id).await?;
        if deleted {
            self.store
                .append_admin_action(admin_action(
                    admin_user_id,
                    action::DELETE_THEME,
                    None,
                    Some(id),
                    None,
                ))
                .await?;
        }
        Ok(deleted)
    }

    async fn log_tag(
        &self,
        admin_user_id: &str,
        action_type: &str,
        name: &str,
        id: Uuid,
    ) -> DomainResult<()> {
        let details = if name.is_empty() {
            None
        } else {
            Some(serde_json::json!({ "name": name }).to_string())
        };
        self.store
            .append_admin_action(admin_action(
                admin_user_id,
                action_type,
                None,
                Some(id),
                details,
            ))
            .await
    }
}

fn validate_theme(
    title: &str,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> DomainResult<()> {
    if title.is_empty() {
        return Err(DomainError::Validation("theme title is required".into()));
    }
    if title.chars().count() > MAX_THEME_TITLE_LEN {
        return Err(DomainError::Validation(format!(
            "theme title must be at most {MAX_THEME_TITLE_LEN} characters"
        )));
    }
    if start_date > end_date {
        return Err(DomainError::Validation(
            "theme start date must not be after its end date".into(),
        ));
    }
    Ok(())
}

fn validate_tag(new: NewTag) -> DomainResult<(String, Option<String>)> {
    let name = new.name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation("tag name is required".into()));
    }
    if name.chars().count() > MAX_TAG_NAME_LEN {
        return Err(DomainError::Validation(format!(
            "tag name must be at most {MAX_TAG_NAME_LEN} characters"
        )));
    }
    Ok((name, new.description))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockWhisperStore;

    fn service(store: MockWhisperStore) -> CatalogService {
        CatalogService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn create_mood_tag_inserts_and_audits() {
        let mut store = MockWhisperStore::new();
        store
            .expect_insert_mood_tag()
            .withf(|t| t.name == "Nostalgia")
            .once()
            .returning(|_| Ok(()));
        store
            .expect_append_admin_action()
            .withf(|a| a.action_type == action::CREATE_MOOD_TAG && a.target_type.is_none())
            .once()
            .returning(|_| Ok(()));

        let tag = service(store)
            .create_mood_tag(
                "admin-1",
                NewTag {
                    name: " Nostalgia ".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(tag.name, "Nostalgia");
    }

    #[tokio::test]
    async fn blank_tag_name_is_rejected() {
        let res = service(MockWhisperStore::new())
            .create_topic_tag(
                "admin-1",
                NewTag {
                    name: "  ".into(),
                    description: None,
                },
            )
            .await;
        assert!(matches!(res, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn inverted_theme_window_is_rejected() {
        let now = Utc::now();
        let res = service(MockWhisperStore::new())
            .create_theme(
                "admin-1",
                NewTheme {
                    title: "Backwards".into(),
                    description: None,
                    start_date: now,
                    end_date: now - chrono::Duration::days(1),
                    is_active: true,
                },
            )
            .await;
        assert!(matches!(res, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn patch_inverting_the_stored_window_is_rejected() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut store = MockWhisperStore::new();
        store.expect_get_theme().once().returning(move |_| {
            Ok(Some(Theme {
                id,
                title: "Steady".into(),
                description: None,
                start_date: now - chrono::Duration::days(1),
                end_date: now + chrono::Duration::days(6),
                is_active: true,
                created_at: now,
            }))
        });
        // No update_theme expectation: writing the inverted window would
        // panic here.

        let res = service(store)
            .update_theme(
                "admin-1",
                id,
                ThemePatch {
                    end_date: Some(now - chrono::Duration::days(2)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(res, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn patching_a_missing_theme_reports_false() {
        let mut store = MockWhisperStore::new();
        store.expect_get_theme().once().returning(|_| Ok(None));

        let updated = service(store)
            .update_theme("admin-1", Uuid::new_v4(), ThemePatch::default())
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn seeding_skips_populated_tables() {
        let mut store = MockWhisperStore::new();
        store.expect_list_mood_tags().once().returning(|| {
            Ok(vec![MoodTag {
                id: Uuid::new_v4(),
                name: "Hope".into(),
                description: None,
                created_at: Utc::now(),
            }])
        });
        store.expect_list_topic_tags().once().returning(|| {
            Ok(vec![TopicTag {
                id: Uuid::new_v4(),
                name: "Work".into(),
                description: None,
                created_at: Utc::now(),
            }])
        });
        // No insert expectations: seeding into populated tables would panic.

        service(store).seed_default_tags().await.unwrap();
    }

    #[tokio::test]
    async fn seeding_fills_empty_tables() {
        let mut store = MockWhisperStore::new();
        store.expect_list_mood_tags().returning(|| Ok(vec![]));
        store.expect_list_topic_tags().returning(|| Ok(vec![]));
        store
            .expect_insert_mood_tag()
            .times(DEFAULT_MOODS.len())
            .returning(|_| Ok(()));
        store
            .expect_insert_topic_tag()
            .times(DEFAULT_TOPICS.len())
            .returning(|_| Ok(()));

        service(store).seed_default_tags().await.unwrap();
    }
}
