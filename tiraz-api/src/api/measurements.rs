//! Measurement photo upload and processing handlers
//!
//! `/process` always answers 200: when the AI service cannot be used the
//! fixed mock set is returned instead, tagged by `data.source`, with an
//! explicit `error` object when the fallback was caused by a failure.

use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::error::Error as StdError;
use tracing::{info, warn};

use crate::{
    db::measurements::{self, MeasurementRecord},
    error::{ApiError, ApiResult},
    models::{
        MeasurementMetadata, MeasurementSource, Measurements, ProcessDebug, ProcessErrorInfo,
        ProcessRequest, ProcessResponse, UploadResponse,
    },
    services::upload_store::{PendingUpload, UploadError, MAX_PROCESS_IMAGES},
    AppState,
};

const USER_ID_FIELD: &str = "userId";
const DEFAULT_HISTORY_LIMIT: u32 = 20;
const MAX_HISTORY_LIMIT: u32 = 100;

/// POST /measurements/upload
///
/// Multipart body: one `userId` text field plus any number of file parts.
/// Parts that declare a content type count as files even without a
/// filename. Every file is checked before anything is written.
pub async fn upload_photos(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut user_id: Option<String> = None;
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(USER_ID_FIELD) {
            user_id = Some(field.text().await?);
            continue;
        }

        // A part with neither filename nor content type is a plain form field
        let (file_name, content_type) = match (field.file_name(), field.content_type()) {
            (None, None) => continue,
            (file_name, content_type) => (
                file_name.or(field.name()).unwrap_or_default().to_string(),
                content_type
                    .unwrap_or("application/octet-stream")
                    .to_string(),
            ),
        };
        let bytes = field.bytes().await?;

        uploads.push(PendingUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    let user_id = user_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Unprocessable("userId field is required".to_string()))?;

    if uploads.is_empty() {
        return Err(ApiError::Unprocessable(
            "at least one file is required".to_string(),
        ));
    }

    let file_count = uploads.len();
    let saved = state.uploads.save_all(&user_id, uploads).await?;

    info!(user_id = %user_id, files = file_count, "Stored measurement photos");

    Ok(Json(UploadResponse {
        status: "success",
        files: saved.iter().map(|p| p.display().to_string()).collect(),
        user_id,
    }))
}

/// POST /measurements/process
pub async fn process_measurements(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<Json<ProcessResponse>> {
    let user_id = request.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(ApiError::Unprocessable("userId must not be empty".to_string()));
    }

    let now = tiraz_common::time::now();
    let metadata = MeasurementMetadata {
        user_id: user_id.clone(),
        height: request.height,
        weight: request.weight,
        timestamp: tiraz_common::time::to_rfc3339_z(now),
    };
    let mock = Measurements::mock(request.height, request.weight).to_value();

    let response = match state.uploads.recent_images(&user_id, MAX_PROCESS_IMAGES).await {
        Ok(images) if images.is_empty() => {
            ProcessResponse::new(MeasurementSource::MockNoImages, mock, user_id.clone(), now)
        }
        Ok(images) => {
            let paths: Vec<String> = images.iter().map(|p| p.display().to_string()).collect();

            match state.ai_client.process_measurements(&paths, &metadata).await {
                Ok(body) => {
                    let measurements = body
                        .get("measurements")
                        .filter(|v| !v.is_null())
                        .cloned()
                        .unwrap_or(mock);
                    info!(user_id = %user_id, images = paths.len(), "Measurements from AI service");
                    ProcessResponse::new(
                        MeasurementSource::AiService,
                        measurements,
                        user_id.clone(),
                        now,
                    )
                }
                Err(err) => {
                    fallback_response(&state, err.kind(), &err, mock, &user_id, now).await
                }
            }
        }
        Err(err @ UploadError::InvalidUserId(_)) => return Err(err.into()),
        Err(err) => fallback_response(&state, "upload_store", &err, mock, &user_id, now).await,
    };

    let record = MeasurementRecord::new(
        &user_id,
        response.data.source,
        request.height,
        request.weight,
        response.data.measurements.clone(),
        now,
    );
    if let Err(e) = measurements::save_measurement(&state.db, &record).await {
        warn!(user_id = %user_id, error = %e, "Failed to persist measurement result");
    }

    Ok(Json(response))
}

async fn fallback_response(
    state: &AppState,
    kind: &str,
    err: &(dyn StdError + Send + Sync + 'static),
    mock: serde_json::Value,
    user_id: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> ProcessResponse {
    let message = err.to_string();
    warn!(user_id = %user_id, kind, error = %message, "Falling back to mock measurements");
    state.record_error(format!("{}: {}", kind, message)).await;

    let mut response = ProcessResponse::new(
        MeasurementSource::MockFallback,
        mock,
        user_id.to_string(),
        now,
    );
    response.error = Some(ProcessErrorInfo {
        kind: kind.to_string(),
        message: message.clone(),
    });
    response.debug = Some(ProcessDebug {
        error: message,
        trace: error_chain(err),
    });
    response
}

/// Display of an error and each of its sources, one per line
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {}", cause));
        source = cause.source();
    }
    lines.join("\n")
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
}

/// GET /measurements/history/:user_id
pub async fn measurement_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<MeasurementRecord>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let records =
        measurements::list_measurements_for_user(&state.db, user_id.trim(), i64::from(limit))
            .await?;

    Ok(Json(records))
}

/// Build measurement routes
pub fn measurement_routes() -> Router<AppState> {
    Router::new()
        .route("/measurements/upload", post(upload_photos))
        .route("/measurements/process", post(process_measurements))
        .route("/measurements/history/:user_id", get(measurement_history))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ai_client::AiClientError;

    #[test]
    fn test_error_chain_lists_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = UploadError::Io(io);

        // Transparent wrapper: display and first source are the same text
        let chain = error_chain(&err);
        assert!(chain.starts_with("denied"));
    }

    #[test]
    fn test_error_chain_single_error() {
        let err = AiClientError::Status {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!(error_chain(&err), "AI service returned HTTP 502: bad gateway");
    }
}
