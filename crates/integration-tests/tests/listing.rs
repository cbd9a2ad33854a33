//! Public listing semantics: filters, search, sort orders, pagination and
//! visibility rules.

use domains::{ContentType, NewTag, NewWhisper, SortOrder, VoteType, WhisperFilters};
use integration_tests::test_app;
use uuid::Uuid;

fn filters() -> WhisperFilters {
    WhisperFilters {
        limit: 50,
        ..Default::default()
    }
}

#[tokio::test]
async fn listing_is_newest_first_by_default() {
    let app = test_app().await;
    let older = app.seed_whisper("first", "203.0.113.1").await;
    let newer = app.seed_whisper("second", "203.0.113.1").await;

    let listed = app.whispers.list(filters()).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|v| v.whisper.id).collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}

#[tokio::test]
async fn mood_filter_narrows_and_unknown_id_matches_nothing() {
    let app = test_app().await;
    let mood = app
        .catalog
        .create_mood_tag(
            "admin-1",
            NewTag {
                name: "Hope".into(),
                description: None,
            },
        )
        .await
        .unwrap();

    app.whispers
        .create_whisper(
            NewWhisper {
                text: "hopeful one".into(),
                mood_tag_id: Some(mood.id),
                ..Default::default()
            },
            "203.0.113.1",
        )
        .await
        .unwrap();
    app.seed_whisper("untagged one", "203.0.113.1").await;

    let matching = app
        .whispers
        .list(WhisperFilters {
            mood_tag_id: Some(mood.id),
            ..filters()
        })
        .await
        .unwrap();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].whisper.text, "hopeful one");
    assert_eq!(matching[0].mood_tag.as_ref().unwrap().name, "Hope");

    let none = app
        .whispers
        .list(WhisperFilters {
            mood_tag_id: Some(Uuid::new_v4()),
            ..filters()
        })
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn search_is_case_insensitive_substring_match() {
    let app = test_app().await;
    app.seed_whisper("Feeling Hopeful today", "203.0.113.1").await;
    app.seed_whisper("something else entirely", "203.0.113.1").await;

    let found = app
        .whispers
        .list(WhisperFilters {
            search: Some("HOPEFUL".into()),
            ..filters()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].whisper.text, "Feeling Hopeful today");

    // Blank searches are treated as no search at all.
    let all = app
        .whispers
        .list(WhisperFilters {
            search: Some("   ".into()),
            ..filters()
        })
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn popular_sort_ranks_by_net_score() {
    let app = test_app().await;
    let low = app.seed_whisper("quiet", "203.0.113.1").await;
    let high = app.seed_whisper("loved", "203.0.113.1").await;
    let negative = app.seed_whisper("disliked", "203.0.113.1").await;

    for i in 0..3 {
        app.votes
            .cast(
                ContentType::Whisper,
                high.id,
                VoteType::Up,
                &format!("198.51.100.{}", i + 1),
            )
            .await
            .unwrap();
    }
    app.votes
        .cast(ContentType::Whisper, negative.id, VoteType::Down, "198.51.100.9")
        .await
        .unwrap();

    let listed = app
        .whispers
        .list(WhisperFilters {
            sort: SortOrder::Popular,
            ..filters()
        })
        .await
        .unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|v| v.whisper.id).collect();
    assert_eq!(ids, vec![high.id, low.id, negative.id]);
}

#[tokio::test]
async fn discussed_sort_ranks_by_reply_count() {
    let app = test_app().await;
    let quiet = app.seed_whisper("no replies", "203.0.113.1").await;
    let busy = app.seed_whisper("busy thread", "203.0.113.1").await;
    app.seed_reply(busy.id, "one", "203.0.113.2").await;
    app.seed_reply(busy.id, "two", "203.0.113.3").await;

    let listed = app
        .whispers
        .list(WhisperFilters {
            sort: SortOrder::Discussed,
            ..filters()
        })
        .await
        .unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|v| v.whisper.id).collect();
    assert_eq!(ids, vec![busy.id, quiet.id]);
    assert_eq!(listed[0].reply_count, 2);
}

#[tokio::test]
async fn pagination_windows_do_not_overlap() {
    let app = test_app().await;
    for i in 0..5 {
        app.seed_whisper(&format!("whisper {i}"), "203.0.113.1").await;
    }

    let page1 = app
        .whispers
        .list(WhisperFilters {
            limit: 2,
            offset: 0,
            ..Default::default()
        })
        .await
        .unwrap();
    let page2 = app
        .whispers
        .list(WhisperFilters {
            limit: 2,
            offset: 2,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page1.len(), 2);
    assert_eq!(page2.len(), 2);
    let ids1: Vec<Uuid> = page1.iter().map(|v| v.whisper.id).collect();
    assert!(page2.iter().all(|v| !ids1.contains(&v.whisper.id)));
}

#[tokio::test]
async fn buried_whispers_are_hidden_but_still_linkable() {
    let app = test_app().await;
    let whisper = app.seed_whisper("soon buried", "203.0.113.1").await;

    for i in 0..domains::DOWNVOTE_BURY_THRESHOLD {
        app.votes
            .cast(
                ContentType::Whisper,
                whisper.id,
                VoteType::Down,
                &format!("198.51.100.{}", i + 1),
            )
            .await
            .unwrap();
    }

    let listed = app.whispers.list(filters()).await.unwrap();
    assert!(listed.is_empty());

    let view = app.whispers.get(whisper.id).await.unwrap();
    assert!(view.whisper.buried);
}
