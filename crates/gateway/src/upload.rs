use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::{Multipart, multipart::MultipartRejection},
};

/// One file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.has_media_type("image/")
    }

    pub fn is_video(&self) -> bool {
        self.has_media_type("video/")
    }

    fn has_media_type(&self, prefix: &str) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with(prefix))
    }
}

/// Collect every part named `field`, in upload order. Other parts are drained
/// and ignored.
pub async fn read_files(
    multipart: Result<Multipart, MultipartRejection>,
    field: &str,
) -> Result<Vec<UploadedFile>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let mut files = Vec::new();

    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if part.name() != Some(field) {
            continue;
        }

        let filename = part.file_name().map(str::to_owned);
        let content_type = part.content_type().map(str::to_owned);
        let bytes = part
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        tracing::debug!(
            field,
            filename = filename.as_deref(),
            content_type = content_type.as_deref(),
            bytes = bytes.len(),
            "Received upload"
        );

        files.push(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Ok(files)
}

/// The single part named `field`.
pub async fn read_file(
    multipart: Result<Multipart, MultipartRejection>,
    field: &str,
) -> Result<UploadedFile, ApiError> {
    read_files(multipart, field)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::BadRequest(format!("Missing multipart field `{}`", field)))
}
