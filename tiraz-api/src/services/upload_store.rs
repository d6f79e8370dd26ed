//! Measurement photo storage
//!
//! Photos live under `{root}/{user dir}/{unix millis}-{file name}`. Each user has
//! their own directory so that processing only ever sees that user's photos.
//! No retention policy is applied; files stay until removed externally.

use axum::body::Bytes;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Upper bound on photos sent to the AI service per request
pub const MAX_PROCESS_IMAGES: usize = 5;

const MAX_USER_ID_LEN: usize = 128;
const USER_DIR_PREFIX_LEN: usize = 32;
const MAX_FILE_NAME_LEN: usize = 120;

/// Upload store errors
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File type {content_type} not allowed for '{file_name}'; only JPEG/PNG allowed")]
    NotAllowed {
        file_name: String,
        content_type: String,
    },

    #[error("Content of '{file_name}' looks like {detected}, not {declared}; not allowed")]
    ContentMismatch {
        file_name: String,
        declared: String,
        detected: String,
    },

    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Accepted photo format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        // Ignore parameters such as "; charset=binary"
        let essence = content_type.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/jpeg" => Some(ImageKind::Jpeg),
            "image/png" => Some(ImageKind::Png),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
        }
    }

    fn matches_extension(&self, ext: &str) -> bool {
        match self {
            ImageKind::Jpeg => matches!(ext, "jpg" | "jpeg"),
            ImageKind::Png => ext == "png",
        }
    }
}

/// One file part taken from a multipart upload
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl PendingUpload {
    /// Check declared content type, then sniff the bytes
    ///
    /// Bytes that `infer` cannot classify are accepted on the declared type.
    pub fn validate(&self) -> Result<ImageKind, UploadError> {
        let kind = ImageKind::from_content_type(&self.content_type).ok_or_else(|| {
            UploadError::NotAllowed {
                file_name: self.file_name.clone(),
                content_type: self.content_type.clone(),
            }
        })?;

        if let Some(detected) = infer::get(&self.bytes) {
            if detected.mime_type() != kind.mime_type() {
                return Err(UploadError::ContentMismatch {
                    file_name: self.file_name.clone(),
                    declared: kind.mime_type().to_string(),
                    detected: detected.mime_type().to_string(),
                });
            }
        }

        Ok(kind)
    }
}

/// Per-user photo directory tree
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one user's photos
    pub fn user_dir(&self, user_id: &str) -> Result<PathBuf, UploadError> {
        Ok(self.root.join(user_dir_name(user_id)?))
    }

    /// Validate every upload, then write them all
    ///
    /// Nothing is written if any file is rejected. Returns the stored paths in
    /// upload order.
    pub async fn save_all(
        &self,
        user_id: &str,
        uploads: Vec<PendingUpload>,
    ) -> Result<Vec<PathBuf>, UploadError> {
        let dir = self.user_dir(user_id)?;

        let validated = uploads
            .into_iter()
            .map(|upload| upload.validate().map(|kind| (upload, kind)))
            .collect::<Result<Vec<_>, _>>()?;

        tokio::fs::create_dir_all(&dir).await?;

        let stamp = tiraz_common::time::unix_millis(tiraz_common::time::now());
        let mut saved = Vec::with_capacity(validated.len());

        for (upload, kind) in validated {
            let file_name = stored_file_name(&upload.file_name, kind);
            let (path, mut file) = create_unique(&dir, stamp, &file_name).await?;

            file.write_all(&upload.bytes).await?;
            file.flush().await?;
            debug!(path = %path.display(), bytes = upload.bytes.len(), "Stored measurement photo");
            saved.push(path);
        }

        Ok(saved)
    }

    /// Most recent photos for one user, newest first
    ///
    /// Ordered by the millisecond prefix, then by file name. A user with no
    /// directory simply has no photos.
    pub async fn recent_images(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<PathBuf>, UploadError> {
        let dir = self.user_dir(user_id)?;
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut images: Vec<(u64, String, PathBuf)> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let path = entry.path();
            if !has_image_extension(&path) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            images.push((timestamp_prefix(&name), name, path));
        }

        images.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));

        Ok(images
            .into_iter()
            .take(limit)
            .map(|(_, _, path)| path)
            .collect())
    }
}

/// Create `{stamp}-{name}` in `dir`, or `{stamp}-{n}-{name}` if taken
///
/// `create_new` makes the claim atomic, so concurrent uploads of the same
/// name in the same millisecond each get their own file.
async fn create_unique(
    dir: &Path,
    stamp: i64,
    file_name: &str,
) -> Result<(PathBuf, tokio::fs::File), UploadError> {
    let mut counter = 0u32;
    loop {
        let path = if counter == 0 {
            dir.join(format!("{}-{}", stamp, file_name))
        } else {
            dir.join(format!("{}-{}-{}", stamp, counter, file_name))
        };

        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Directory name for one user: readable prefix plus SHA-256 of the id
///
/// The prefix only helps operators find a directory; the digest keeps ids
/// that clean up to the same prefix (`alice/1`, `alice_1`) apart.
pub fn user_dir_name(user_id: &str) -> Result<String, UploadError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty()
        || trimmed.chars().all(|c| c == '.')
        || trimmed.len() > MAX_USER_ID_LEN
    {
        return Err(UploadError::InvalidUserId(user_id.to_string()));
    }

    let prefix: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '@'))
        .take(USER_DIR_PREFIX_LEN)
        .collect();
    let digest = format!("{:x}", Sha256::digest(trimmed.as_bytes()));

    if prefix.is_empty() {
        Ok(digest)
    } else {
        Ok(format!("{}-{}", prefix, digest))
    }
}

/// Client file name reduced to a safe base name carrying the right extension
fn stored_file_name(original: &str, kind: ImageKind) -> String {
    // Clients may send full paths; keep only the last component
    let base = original.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");

    let mut cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string();

    if cleaned.is_empty() {
        cleaned = "photo".to_string();
    }
    if cleaned.len() > MAX_FILE_NAME_LEN {
        cleaned.truncate(MAX_FILE_NAME_LEN);
    }

    let has_matching_ext = Path::new(&cleaned)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| kind.matches_extension(&e.to_ascii_lowercase()))
        .unwrap_or(false);

    if has_matching_ext {
        cleaned
    } else {
        format!("{}.{}", cleaned, kind.extension())
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"))
        .unwrap_or(false)
}

/// Leading decimal digits of a stored file name (0 if none)
fn timestamp_prefix(name: &str) -> u64 {
    let digits: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
