//! Demo catalog items written by the seeder

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub style: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn insert_item(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    style: &str,
    created_at: DateTime<Utc>,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO items (name, description, style, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(description)
    .bind(style)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Returns the number of rows removed
pub async fn delete_all_items(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM items").execute(pool).await?;
    Ok(result.rows_affected())
}

pub async fn list_items(pool: &SqlitePool) -> Result<Vec<Item>> {
    let items = sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(items)
}

pub async fn count_items(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
