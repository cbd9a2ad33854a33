//! Theme windowing and default tag seeding.

use chrono::{Duration, Utc};
use domains::{NewTheme, ThemePatch};
use integration_tests::test_app;

fn theme(title: &str, start_offset_days: i64, end_offset_days: i64, active: bool) -> NewTheme {
    let now = Utc::now();
    NewTheme {
        title: title.into(),
        description: None,
        start_date: now + Duration::days(start_offset_days),
        end_date: now + Duration::days(end_offset_days),
        is_active: active,
    }
}

#[tokio::test]
async fn current_theme_is_the_one_whose_window_contains_now() {
    let app = test_app().await;
    app.catalog
        .create_theme("admin-1", theme("Last week", -14, -7, true))
        .await
        .unwrap();
    let live = app
        .catalog
        .create_theme("admin-1", theme("This week", -1, 6, true))
        .await
        .unwrap();
    app.catalog
        .create_theme("admin-1", theme("Next week", 7, 14, true))
        .await
        .unwrap();

    let current = app.catalog.current_theme(Utc::now()).await.unwrap();
    assert_eq!(current.map(|t| t.id), Some(live.id));
}

#[tokio::test]
async fn overlapping_windows_prefer_the_later_start() {
    let app = test_app().await;
    app.catalog
        .create_theme("admin-1", theme("Long running", -10, 10, true))
        .await
        .unwrap();
    let fresher = app
        .catalog
        .create_theme("admin-1", theme("Fresh prompt", -1, 5, true))
        .await
        .unwrap();

    let current = app.catalog.current_theme(Utc::now()).await.unwrap();
    assert_eq!(current.map(|t| t.id), Some(fresher.id));
}

#[tokio::test]
async fn inactive_themes_are_never_current() {
    let app = test_app().await;
    let only = app
        .catalog
        .create_theme("admin-1", theme("Paused", -1, 5, false))
        .await
        .unwrap();

    assert!(app.catalog.current_theme(Utc::now()).await.unwrap().is_none());

    // Flipping it active brings it back without touching the window.
    let updated = app
        .catalog
        .update_theme(
            "admin-1",
            only.id,
            ThemePatch {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(updated);
    let current = app.catalog.current_theme(Utc::now()).await.unwrap();
    assert_eq!(current.map(|t| t.id), Some(only.id));
}

#[tokio::test]
async fn theme_windows_must_be_ordered() {
    let app = test_app().await;
    let res = app
        .catalog
        .create_theme("admin-1", theme("Backwards", 5, -5, true))
        .await;
    assert!(matches!(res, Err(domains::DomainError::Validation(_))));
}

#[tokio::test]
async fn a_patch_cannot_invert_a_stored_window() {
    let app = test_app().await;
    let stored = app
        .catalog
        .create_theme("admin-1", theme("Steady", -1, 6, true))
        .await
        .unwrap();

    let res = app
        .catalog
        .update_theme(
            "admin-1",
            stored.id,
            ThemePatch {
                end_date: Some(Utc::now() - Duration::days(2)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(res, Err(domains::DomainError::Validation(_))));

    // The stored window is untouched.
    let current = app.catalog.current_theme(Utc::now()).await.unwrap();
    assert_eq!(current.map(|t| t.id), Some(stored.id));
}

#[tokio::test]
async fn default_tags_seed_once() {
    let app = test_app().await;

    app.catalog.seed_default_tags().await.unwrap();
    let moods = app.catalog.mood_tags().await.unwrap();
    let topics = app.catalog.topic_tags().await.unwrap();
    assert_eq!(moods.len(), 7);
    assert_eq!(topics.len(), 5);
    assert!(moods.iter().any(|t| t.name == "Hope"));

    // A second run must not duplicate anything.
    app.catalog.seed_default_tags().await.unwrap();
    assert_eq!(app.catalog.mood_tags().await.unwrap().len(), 7);
    assert_eq!(app.catalog.topic_tags().await.unwrap().len(), 5);
}
