//! Measurement upload and processing payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body measurements in centimetres
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    pub chest: f64,
    pub waist: f64,
    pub shoulders: f64,
    pub arm_length: f64,
    pub neck: f64,
    pub hip: f64,
    pub height: f64,
    pub weight: f64,
    pub unit: String,
}

impl Measurements {
    /// Fixed placeholder set used whenever the AI path is unavailable
    ///
    /// Height and weight are echoed from the request.
    pub fn mock(height: f64, weight: f64) -> Self {
        Self {
            chest: 98.0,
            waist: 82.0,
            shoulders: 44.0,
            arm_length: 62.0,
            neck: 38.0,
            hip: 96.0,
            height,
            weight,
            unit: "cm".to_string(),
        }
    }

    pub fn to_value(&self) -> Value {
        // A struct of numbers and a string always serializes
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Metadata forwarded to the AI service alongside the image paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementMetadata {
    pub user_id: String,
    pub height: f64,
    pub weight: f64,
    /// RFC 3339, UTC, `Z` suffix
    pub timestamp: String,
}

/// `POST /measurements/process` body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub height: f64,
    pub weight: f64,
    pub user_id: String,
}

/// Where a processed measurement set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementSource {
    AiService,
    MockNoImages,
    MockFallback,
}

impl MeasurementSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementSource::AiService => "ai_service",
            MeasurementSource::MockNoImages => "mock_no_images",
            MeasurementSource::MockFallback => "mock_fallback",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            MeasurementSource::AiService => "Measurements processed via AI service",
            MeasurementSource::MockNoImages => "No images found - using mock data",
            MeasurementSource::MockFallback => "AI service unavailable - using mock data",
        }
    }
}

impl std::fmt::Display for MeasurementSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessData {
    pub measurements: Value,
    pub user_id: String,
    pub processed_at: String,
    pub source: MeasurementSource,
}

/// Machine-readable description of why the fallback was used
#[derive(Debug, Clone, Serialize)]
pub struct ProcessErrorInfo {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessDebug {
    pub error: String,
    /// Error source chain, outermost first
    pub trace: String,
}

/// `POST /measurements/process` response
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResponse {
    pub status: &'static str,
    pub message: String,
    pub data: ProcessData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ProcessErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<ProcessDebug>,
}

impl ProcessResponse {
    pub fn new(
        source: MeasurementSource,
        measurements: Value,
        user_id: String,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: "success",
            message: source.message().to_string(),
            data: ProcessData {
                measurements,
                user_id,
                processed_at: tiraz_common::time::to_rfc3339_z(processed_at),
                source,
            },
            error: None,
            debug: None,
        }
    }
}

/// `POST /measurements/upload` response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub status: &'static str,
    pub files: Vec<String>,
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mock_serializes_camel_case() {
        let value = Measurements::mock(175.0, 70.0).to_value();

        assert_eq!(value["armLength"], json!(62.0));
        assert_eq!(value["height"], json!(175.0));
        assert_eq!(value["unit"], "cm");
        assert!(value.get("arm_length").is_none());
    }

    #[test]
    fn test_source_tags() {
        assert_eq!(
            serde_json::to_value(MeasurementSource::MockNoImages).unwrap(),
            json!("mock_no_images")
        );
        assert_eq!(MeasurementSource::AiService.to_string(), "ai_service");
    }

    #[test]
    fn test_process_request_requires_user_id() {
        let result: Result<ProcessRequest, _> =
            serde_json::from_value(json!({"height": 170, "weight": 65}));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_omits_absent_error_and_debug() {
        let response = ProcessResponse::new(
            MeasurementSource::AiService,
            json!({"chest": 100}),
            "u1".to_string(),
            Utc::now(),
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["data"]["userId"], "u1");
        assert!(value.get("error").is_none());
        assert!(value.get("debug").is_none());
    }
}
