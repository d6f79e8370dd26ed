//! Catalog CRUD handlers
//!
//! Categories, designs, fabrics and colors share the list/get/delete
//! handlers through [`CatalogEntity`]; create and update are per entity.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{
    db::catalog as repo,
    error::{ApiError, ApiResult},
    models::{
        CatalogEntity, Category, CategoryInput, CategoryPatch, Color, ColorInput, ColorPatch,
        Design, DesignInput, DesignPatch, Fabric, FabricInput, FabricPatch,
    },
    AppState,
};

fn not_found<T: CatalogEntity>(id: i64) -> ApiError {
    ApiError::NotFound(format!("{} {} not found", T::LABEL, id))
}

pub async fn list_entities<T: CatalogEntity>(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<T>>> {
    Ok(Json(repo::list::<T>(&state.db).await?))
}

pub async fn get_entity<T: CatalogEntity>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<T>> {
    repo::get::<T>(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<T>(id))
}

pub async fn delete_entity<T: CatalogEntity>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if repo::delete::<T>(&state.db, id).await? {
        tracing::info!(table = T::TABLE, id, "Deleted catalog entry");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<T>(id))
    }
}

async fn ensure_category_exists(pool: &SqlitePool, category_id: Option<i64>) -> ApiResult<()> {
    let Some(id) = category_id else {
        return Ok(());
    };
    if !repo::exists::<Category>(pool, id).await? {
        return Err(ApiError::BadRequest(format!("Category {} does not exist", id)));
    }
    Ok(())
}

// Categories

pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CategoryInput>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    input.validate().map_err(ApiError::BadRequest)?;
    let category = repo::insert_category(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<CategoryPatch>,
) -> ApiResult<Json<Category>> {
    patch.validate().map_err(ApiError::BadRequest)?;
    repo::update_category(&state.db, id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Category>(id))
}

// Designs

#[derive(Debug, Deserialize)]
pub struct DesignFilter {
    pub category_id: Option<i64>,
}

pub async fn list_designs(
    State(state): State<AppState>,
    Query(filter): Query<DesignFilter>,
) -> ApiResult<Json<Vec<Design>>> {
    Ok(Json(repo::list_designs(&state.db, filter.category_id).await?))
}

pub async fn create_design(
    State(state): State<AppState>,
    Json(input): Json<DesignInput>,
) -> ApiResult<(StatusCode, Json<Design>)> {
    input.validate().map_err(ApiError::BadRequest)?;
    ensure_category_exists(&state.db, input.category_id).await?;
    let design = repo::insert_design(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(design)))
}

pub async fn update_design(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<DesignPatch>,
) -> ApiResult<Json<Design>> {
    patch.validate().map_err(ApiError::BadRequest)?;
    ensure_category_exists(&state.db, patch.category_id).await?;
    repo::update_design(&state.db, id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Design>(id))
}

// Fabrics

pub async fn create_fabric(
    State(state): State<AppState>,
    Json(input): Json<FabricInput>,
) -> ApiResult<(StatusCode, Json<Fabric>)> {
    input.validate().map_err(ApiError::BadRequest)?;
    let fabric = repo::insert_fabric(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(fabric)))
}

pub async fn update_fabric(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<FabricPatch>,
) -> ApiResult<Json<Fabric>> {
    patch.validate().map_err(ApiError::BadRequest)?;
    repo::update_fabric(&state.db, id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Fabric>(id))
}

// Colors

pub async fn create_color(
    State(state): State<AppState>,
    Json(input): Json<ColorInput>,
) -> ApiResult<(StatusCode, Json<Color>)> {
    input.validate().map_err(ApiError::BadRequest)?;
    let color = repo::insert_color(&state.db, &input).await?;
    Ok((StatusCode::CREATED, Json(color)))
}

pub async fn update_color(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ColorPatch>,
) -> ApiResult<Json<Color>> {
    patch.validate().map_err(ApiError::BadRequest)?;
    repo::update_color(&state.db, id, &patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<Color>(id))
}

/// Build catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(list_entities::<Category>).post(create_category),
        )
        .route(
            "/categories/:id",
            get(get_entity::<Category>)
                .put(update_category)
                .delete(delete_entity::<Category>),
        )
        .route("/designs", get(list_designs).post(create_design))
        .route(
            "/designs/:id",
            get(get_entity::<Design>)
                .put(update_design)
                .delete(delete_entity::<Design>),
        )
        .route("/fabrics", get(list_entities::<Fabric>).post(create_fabric))
        .route(
            "/fabrics/:id",
            get(get_entity::<Fabric>)
                .put(update_fabric)
                .delete(delete_entity::<Fabric>),
        )
        .route("/colors", get(list_entities::<Color>).post(create_color))
        .route(
            "/colors/:id",
            get(get_entity::<Color>)
                .put(update_color)
                .delete(delete_entity::<Color>),
        )
}
