use std::path::Path;

use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::uploads::UploadResponse,
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
};

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Blob-storage stand-in: persist the image under the upload directory and
/// hand back a reference URL. The rest of the system only ever stores that
/// URL string; image bytes are never inspected beyond this gate.
pub async fn store_image(
    config: &AppConfig,
    content_type: &str,
    bytes: &[u8],
) -> AppResult<ApiResponse<UploadResponse>> {
    let ext = extension_for(content_type).ok_or(AppError::Validation("contentType"))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("body"));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest("Image exceeds the 10 MiB limit".into()));
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(anyhow::Error::from)?;

    let filename = format!("{}.{ext}", Uuid::new_v4());
    let path = Path::new(&config.upload_dir).join(&filename);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(anyhow::Error::from)?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "image stored");

    Ok(ApiResponse::success(
        "Image stored",
        UploadResponse {
            url: format!("/uploads/{filename}"),
        },
        Some(Meta::empty()),
    ))
}
