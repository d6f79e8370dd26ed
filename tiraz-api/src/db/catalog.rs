//! Catalog table queries
//!
//! List/get/delete are generic over [`CatalogEntity`]; inserts and updates
//! are per entity since their columns differ. Updates use `COALESCE` so that
//! absent patch fields keep their stored value.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tiraz_common::Error;

use crate::models::{
    CatalogEntity, Category, CategoryInput, CategoryPatch, Color, ColorInput, ColorPatch, Design,
    DesignInput, DesignPatch, Fabric, FabricInput, FabricPatch,
};

/// All rows of one table, ordered by id
pub async fn list<T: CatalogEntity>(pool: &SqlitePool) -> Result<Vec<T>> {
    let sql = format!("SELECT * FROM {} ORDER BY id", T::TABLE);
    let rows = sqlx::query_as::<_, T>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn get<T: CatalogEntity>(pool: &SqlitePool, id: i64) -> Result<Option<T>> {
    let sql = format!("SELECT * FROM {} WHERE id = ?", T::TABLE);
    let row = sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Returns false if no row had that id
pub async fn delete<T: CatalogEntity>(pool: &SqlitePool, id: i64) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists<T: CatalogEntity>(pool: &SqlitePool, id: i64) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?)", T::TABLE);
    let found: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(pool).await?;
    Ok(found)
}

pub async fn insert_category(pool: &SqlitePool, input: &CategoryInput) -> Result<Category> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, name_ar, description, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(input.name.trim())
    .bind(&input.name_ar)
    .bind(&input.description)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    patch: &CategoryPatch,
) -> Result<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories SET
            name = COALESCE(?, name),
            name_ar = COALESCE(?, name_ar),
            description = COALESCE(?, description),
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(patch.name.as_deref().map(str::trim))
    .bind(&patch.name_ar)
    .bind(&patch.description)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Designs, optionally restricted to one category
pub async fn list_designs(pool: &SqlitePool, category_id: Option<i64>) -> Result<Vec<Design>> {
    match category_id {
        Some(category_id) => {
            let rows = sqlx::query_as::<_, Design>(
                "SELECT * FROM designs WHERE category_id = ? ORDER BY id",
            )
            .bind(category_id)
            .fetch_all(pool)
            .await?;
            Ok(rows)
        }
        None => list::<Design>(pool).await,
    }
}

pub async fn insert_design(pool: &SqlitePool, input: &DesignInput) -> Result<Design> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, Design>(
        r#"
        INSERT INTO designs (category_id, name, description, image_url, base_price, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(input.category_id)
    .bind(input.name.trim())
    .bind(&input.description)
    .bind(&input.image_url)
    .bind(input.base_price)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| Error::from_write(e, "Design category"))?;

    Ok(row)
}

pub async fn update_design(
    pool: &SqlitePool,
    id: i64,
    patch: &DesignPatch,
) -> Result<Option<Design>> {
    let row = sqlx::query_as::<_, Design>(
        r#"
        UPDATE designs SET
            category_id = COALESCE(?, category_id),
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            image_url = COALESCE(?, image_url),
            base_price = COALESCE(?, base_price),
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(patch.category_id)
    .bind(patch.name.as_deref().map(str::trim))
    .bind(&patch.description)
    .bind(&patch.image_url)
    .bind(patch.base_price)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| Error::from_write(e, "Design category"))?;

    Ok(row)
}

pub async fn insert_fabric(pool: &SqlitePool, input: &FabricInput) -> Result<Fabric> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, Fabric>(
        r#"
        INSERT INTO fabrics (name, material, price_per_meter, in_stock, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(input.name.trim())
    .bind(&input.material)
    .bind(input.price_per_meter)
    .bind(input.in_stock)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn update_fabric(
    pool: &SqlitePool,
    id: i64,
    patch: &FabricPatch,
) -> Result<Option<Fabric>> {
    let row = sqlx::query_as::<_, Fabric>(
        r#"
        UPDATE fabrics SET
            name = COALESCE(?, name),
            material = COALESCE(?, material),
            price_per_meter = COALESCE(?, price_per_meter),
            in_stock = COALESCE(?, in_stock),
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(patch.name.as_deref().map(str::trim))
    .bind(&patch.material)
    .bind(patch.price_per_meter)
    .bind(patch.in_stock)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn insert_color(pool: &SqlitePool, input: &ColorInput) -> Result<Color> {
    let now = Utc::now();
    let row = sqlx::query_as::<_, Color>(
        r#"
        INSERT INTO colors (name, hex_code, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(input.name.trim())
    .bind(input.hex_code.to_ascii_uppercase())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn update_color(pool: &SqlitePool, id: i64, patch: &ColorPatch) -> Result<Option<Color>> {
    let row = sqlx::query_as::<_, Color>(
        r#"
        UPDATE colors SET
            name = COALESCE(?, name),
            hex_code = COALESCE(?, hex_code),
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(patch.name.as_deref().map(str::trim))
    .bind(patch.hex_code.as_deref().map(str::to_ascii_uppercase))
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
