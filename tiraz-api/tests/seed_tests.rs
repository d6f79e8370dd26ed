//! Integration tests for the demo seeder
//!
//! Tests cover:
//! - Twelve items across five styles
//! - Clearing removes earlier rows; keeping appends
//! - Summary grouping of stored rows

use chrono::{Duration, Utc};
use tiraz_api::db::items::{count_items, insert_item, list_items};
use tiraz_api::seed::{self, DEMO_ITEMS};
use tiraz_common::db::init_database;

#[tokio::test]
async fn test_seed_inserts_twelve_items_across_five_styles() {
    let pool = init_database("sqlite::memory:").await.unwrap();
    let now = Utc::now();

    let created = seed::insert_demo_items(&pool, now).await.unwrap();

    assert_eq!(created.len(), 12);
    assert_eq!(count_items(&pool).await.unwrap(), 12);

    let groups = seed::group_by_style(&created);
    let styles: Vec<&str> = groups.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(styles, vec!["Traditional", "Formal", "Casual", "Luxury", "Modern"]);
    assert_eq!(groups[2].1.len(), 4, "Casual has four items");
}

#[tokio::test]
async fn test_seed_created_at_round_trips_through_database() {
    let pool = init_database("sqlite::memory:").await.unwrap();
    let now = Utc::now();

    seed::insert_demo_items(&pool, now).await.unwrap();
    let stored = list_items(&pool).await.unwrap();

    let close = |actual: chrono::DateTime<Utc>, expected: chrono::DateTime<Utc>| {
        (actual - expected).num_milliseconds().abs() < 1
    };

    assert_eq!(stored[0].name, DEMO_ITEMS[0].name);
    assert!(close(stored[0].created_at, now - Duration::days(6)));
    assert!(close(
        stored[5].created_at,
        now - Duration::days(4) - Duration::hours(10)
    ));
}

#[tokio::test]
async fn test_clear_removes_existing_rows() {
    let pool = init_database("sqlite::memory:").await.unwrap();
    insert_item(&pool, "Old item", "stale", "Formal", Utc::now())
        .await
        .unwrap();

    let removed = seed::clear_items(&pool).await.unwrap();
    seed::insert_demo_items(&pool, Utc::now()).await.unwrap();

    assert_eq!(removed, 1);
    let names: Vec<String> = list_items(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names.len(), 12);
    assert!(!names.contains(&"Old item".to_string()));
}

#[tokio::test]
async fn test_keeping_existing_rows_appends() {
    let pool = init_database("sqlite::memory:").await.unwrap();
    insert_item(&pool, "Old item", "stale", "Formal", Utc::now())
        .await
        .unwrap();

    seed::insert_demo_items(&pool, Utc::now()).await.unwrap();

    assert_eq!(count_items(&pool).await.unwrap(), 13);
}

#[tokio::test]
async fn test_summary_of_seeded_items() {
    let pool = init_database("sqlite::memory:").await.unwrap();
    let created = seed::insert_demo_items(&pool, Utc::now()).await.unwrap();

    let summary = seed::render_summary(&created);

    assert!(summary.contains("Traditional: 2 items"));
    assert!(summary.contains("Casual: 4 items"));
    assert!(summary.contains("  - Summer Light Thobe"));
    assert!(summary.contains("  ... and 2 more"));
}
