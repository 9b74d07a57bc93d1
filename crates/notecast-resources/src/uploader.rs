//! Upload collaborator for the image registry.

use std::time::Duration;

use rand::RngExt;
use serde::Deserialize;
use tracing::info;
use ureq::Agent;

use crate::error::UploadError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 60;

/// External upload service.
///
/// Returns the remote locator for the uploaded bytes.
pub trait ImageUploader {
    fn upload(&self, data: &[u8], filename: &str, token: &str) -> Result<String, UploadError>;
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Multipart HTTP implementation of [`ImageUploader`].
pub struct HttpImageUploader {
    agent: Agent,
    base_url: String,
}

impl HttpImageUploader {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }
}

impl ImageUploader for HttpImageUploader {
    fn upload(&self, data: &[u8], filename: &str, token: &str) -> Result<String, UploadError> {
        let url = format!("{}/upload", self.base_url);
        info!(filename, "uploading image");

        // Build multipart form data manually
        let boundary = format!("----NcFormBoundary{:016x}", rand::rng().random::<u64>());
        let mut body = Vec::new();

        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {token}"))
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("Accept", "application/json")
            .send(&body[..])?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(UploadError::HttpResponse {
                status,
                body: error_body,
            });
        }

        let parsed: UploadResponse = body_reader.read_json()?;
        match (parsed.url, parsed.error) {
            (Some(url), _) => Ok(url),
            (None, Some(error)) => Err(UploadError::Rejected(error)),
            (None, None) => Err(UploadError::Rejected("empty upload response".to_owned())),
        }
    }
}
