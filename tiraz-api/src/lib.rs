//! tiraz-api library interface
//!
//! Exposes the router and shared state for the server binary and for
//! integration tests.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod seed;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tiraz_common::Settings;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::{AiClient, AiClientError, UploadStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Validated settings
    pub settings: Arc<Settings>,
    /// Measurement inference service client
    pub ai_client: AiClient,
    /// Per-user photo storage under `UPLOAD_DIR`
    pub uploads: UploadStore,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last upstream error, reported by `/health`
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, settings: Settings) -> Result<Self, AiClientError> {
        let ai_client = AiClient::new(&settings.ai_service_url)?;
        let uploads = UploadStore::new(settings.upload_dir.clone());

        Ok(Self {
            db,
            settings: Arc::new(settings),
            ai_client,
            uploads,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }

    /// Remember an error for `/health`
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
///
/// Measurement and catalog routes live under `API_V1_PREFIX`; `/health` is
/// always at the root.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(api::measurement_routes())
        .merge(api::catalog_routes());

    let prefix = state.settings.api_v1_prefix.as_str();
    let router = if prefix.is_empty() {
        Router::new().merge(api_routes)
    } else {
        Router::new().nest(prefix, api_routes)
    };

    router
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(state.settings.max_upload_bytes))
        .layer(cors_layer(&state.settings.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS from the configured origin list; `*` allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
