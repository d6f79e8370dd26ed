//! Outbound AI client and photo storage

pub mod ai_client;
pub mod upload_store;

pub use ai_client::{AiClient, AiClientError};
pub use upload_store::{ImageKind, PendingUpload, UploadError, UploadStore};
