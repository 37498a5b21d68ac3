use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::config;
use crate::error::ApiError;
use crate::media::{self, CloudinaryClient, ImageUpload, UploadedImage};
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/upload - Upload a character image, returning its hosted URL
///
/// Expects a multipart body with a `file` part holding an image.
pub async fn upload_post(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadedImage> {
    let mut multipart = multipart?;
    let mut upload: Option<ImageUpload> = None;
    let settings = config::config();
    let max_bytes = settings.api.max_upload_bytes;

    while let Some(field) = multipart.next_field().await.map_err(|e| chunk_error(e, max_bytes))? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        if !media::is_image(&content_type) {
            return Err(ApiError::bad_request(media::NOT_AN_IMAGE));
        }
        let bytes = read_limited(field, &content_type, max_bytes).await?;

        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    let upload = upload.ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let client = CloudinaryClient::new(&settings.media)?;
    let uploaded = client.upload(upload).await?;
    Ok(ApiResponse::success(uploaded))
}

/// Buffer a file part, stopping as soon as it passes `max_bytes`
async fn read_limited(
    mut field: Field<'_>,
    content_type: &str,
    max_bytes: usize,
) -> Result<Vec<u8>, ApiError> {
    let mut bytes = Vec::new();

    while let Some(chunk) = field.chunk().await.map_err(|e| chunk_error(e, max_bytes))? {
        bytes.extend_from_slice(&chunk);
        media::validate_image(content_type, bytes.len(), max_bytes).map_err(ApiError::bad_request)?;
    }

    Ok(bytes)
}

/// The request body limit surfaces as a multipart error; it still means the file is too big
fn chunk_error(err: MultipartError, max_bytes: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::debug!("Upload hit the request body limit: {}", err);
        return ApiError::bad_request(media::size_limit_message(max_bytes));
    }
    err.into()
}
