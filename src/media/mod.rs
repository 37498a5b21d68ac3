//! Image upload to the Cloudinary media host.
//!
//! Uploads are signed server-side with the account's API secret, so clients
//! never see credentials. Every image lands in the configured folder and is
//! run through the configured incoming transformation.

use chrono::Utc;
use once_cell::sync::Lazy;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::config::MediaConfig;

static HTTP: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_default()
});

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("media host credentials are not configured")]
    NotConfigured,

    #[error("media host request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("media host rejected upload ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Image received from a client, already validated
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub const NOT_AN_IMAGE: &str = "File must be an image";

pub fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

pub fn size_limit_message(max_bytes: usize) -> String {
    format!("File size must be less than {}MB", max_bytes / (1024 * 1024))
}

/// Check a client file before it is sent anywhere.
pub fn validate_image(content_type: &str, size: usize, max_bytes: usize) -> Result<(), String> {
    if !is_image(content_type) {
        return Err(NOT_AN_IMAGE.to_string());
    }
    if size > max_bytes {
        return Err(size_limit_message(max_bytes));
    }
    Ok(())
}

pub struct CloudinaryClient<'a> {
    config: &'a MediaConfig,
}

impl<'a> CloudinaryClient<'a> {
    pub fn new(config: &'a MediaConfig) -> Result<Self, MediaError> {
        if !config.is_configured() {
            return Err(MediaError::NotConfigured);
        }
        Ok(Self { config })
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.config.api_base, self.config.cloud_name)
    }

    /// Parameters covered by the signature, sorted by key
    fn signed_params(&self, timestamp: i64) -> Vec<(&'static str, String)> {
        vec![
            ("folder", self.config.folder.clone()),
            ("timestamp", timestamp.to_string()),
            ("transformation", self.config.transformation.clone()),
        ]
    }

    fn sign(&self, params: &[(&'static str, String)]) -> String {
        let to_sign = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError> {
        let params = self.signed_params(Utc::now().timestamp());
        let signature = self.sign(&params);

        let file = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;

        let mut form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = HTTP.post(self.upload_url()).multipart(form).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::info!("Uploaded image {}", uploaded.public_id);

        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media_config() -> MediaConfig {
        MediaConfig {
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
            cloud_name: "demo".to_string(),
            api_key: "1234".to_string(),
            api_secret: "abcd".to_string(),
            folder: "game-characters".to_string(),
            transformation: "c_limit,w_800,h_800/q_auto/f_auto".to_string(),
        }
    }

    #[test]
    fn accepts_small_images() {
        assert!(validate_image("image/png", 1024, 5 * 1024 * 1024).is_ok());
    }

    #[test]
    fn rejects_non_images() {
        assert_eq!(
            validate_image("application/pdf", 10, 5 * 1024 * 1024),
            Err("File must be an image".to_string())
        );
    }

    #[test]
    fn rejects_oversized_images() {
        let max = 5 * 1024 * 1024;
        assert!(validate_image("image/jpeg", max, max).is_ok());
        assert_eq!(
            validate_image("image/jpeg", max + 1, max),
            Err("File size must be less than 5MB".to_string())
        );
    }

    #[test]
    fn size_message_names_the_limit_in_megabytes() {
        assert_eq!(size_limit_message(5 * 1024 * 1024), "File size must be less than 5MB");
        assert!(!is_image("text/plain"));
        assert!(is_image("image/webp"));
    }

    #[test]
    fn requires_credentials() {
        let mut config = media_config();
        config.api_secret.clear();
        assert!(matches!(CloudinaryClient::new(&config), Err(MediaError::NotConfigured)));
    }

    #[test]
    fn builds_upload_url() {
        let config = media_config();
        let client = CloudinaryClient::new(&config).unwrap();
        assert_eq!(client.upload_url(), "https://api.cloudinary.com/v1_1/demo/image/upload");
    }

    #[test]
    fn signs_sorted_params_with_secret() {
        let config = media_config();
        let client = CloudinaryClient::new(&config).unwrap();
        let params = client.signed_params(1_700_000_000);

        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);

        let mut hasher = Sha256::new();
        hasher.update(
            "folder=game-characters&timestamp=1700000000&transformation=c_limit,w_800,h_800/q_auto/f_autoabcd"
                .as_bytes(),
        );
        let expected = format!("{:x}", hasher.finalize());

        let signature = client.sign(&params);
        assert_eq!(signature, expected);
        assert_eq!(signature.len(), 64);
    }
}
