//! Processed measurement history

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::MeasurementSource;

/// One processed result, as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    pub id: Uuid,
    pub user_id: String,
    pub source: String,
    pub height: f64,
    pub weight: f64,
    pub measurements: Value,
    pub processed_at: DateTime<Utc>,
}

impl MeasurementRecord {
    pub fn new(
        user_id: &str,
        source: MeasurementSource,
        height: f64,
        weight: f64,
        measurements: Value,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            source: source.as_str().to_string(),
            height,
            weight,
            measurements,
            processed_at,
        }
    }
}

pub async fn save_measurement(pool: &SqlitePool, record: &MeasurementRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO measurements (id, user_id, source, height, weight, measurements, processed_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.id.to_string())
    .bind(&record.user_id)
    .bind(&record.source)
    .bind(record.height)
    .bind(record.weight)
    .bind(serde_json::to_string(&record.measurements)?)
    .bind(record.processed_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// A user's records, newest first
pub async fn list_measurements_for_user(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<MeasurementRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, source, height, weight, measurements, processed_at
        FROM measurements
        WHERE user_id = ?
        ORDER BY processed_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let id: String = row.get("id");
            let measurements: String = row.get("measurements");

            Ok(MeasurementRecord {
                id: Uuid::parse_str(&id)?,
                user_id: row.get("user_id"),
                source: row.get("source"),
                height: row.get("height"),
                weight: row.get("weight"),
                measurements: serde_json::from_str(&measurements)?,
                processed_at: row.get("processed_at"),
            })
        })
        .collect()
}
