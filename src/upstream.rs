//! Client for the external image-generation service.

use std::time::Duration;

use reqwest::{Client, multipart};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::settings::SettingsMap;

const UPLOAD_FILE_NAME: &str = "input.jpg";
const UPLOAD_MIME_TYPE: &str = "image/jpeg";
/// Upper bound for the `/health` probe of the design service.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("design service error: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("failed to reach design service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("design service returned an unreadable response: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesignEndpoint {
    Basic,
    Advanced,
    Variations,
}

impl DesignEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::Basic => "/generate/",
            Self::Advanced => "/generate/advanced",
            Self::Variations => "/generate/variations",
        }
    }

    /// Caller-supplied settings go to the advanced endpoint, which is the only
    /// single-image endpoint that reads them.
    pub fn for_settings(settings: &SettingsMap) -> Self {
        if settings.is_empty() {
            Self::Basic
        } else {
            Self::Advanced
        }
    }
}

/// Multipart fields of one generation call.
#[derive(Debug, Clone)]
pub struct GenerationForm {
    pub image: Vec<u8>,
    pub prompt: String,
    /// JSON-encoded settings object.
    pub settings: Option<String>,
    pub num_variations: Option<u32>,
}

impl GenerationForm {
    fn into_multipart(self) -> Result<multipart::Form, UpstreamError> {
        let file = multipart::Part::bytes(self.image)
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(UPLOAD_MIME_TYPE)
            .map_err(UpstreamError::Transport)?;
        let mut form = multipart::Form::new()
            .part("file", file)
            .text("prompt", self.prompt);
        if let Some(settings) = self.settings {
            form = form.text("settings", settings);
        }
        if let Some(count) = self.num_variations {
            form = form.text("num_variations", count.to_string());
        }
        Ok(form)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerationResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub output: Vec<String>,
    pub variations: Option<Vec<String>>,
    pub error: Option<String>,
    pub settings_used: Option<Value>,
}

#[derive(Clone, Debug)]
pub struct DesignServiceClient {
    client: Client,
    base_url: String,
    health_timeout: Duration,
}

impl DesignServiceClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            health_timeout: HEALTH_TIMEOUT,
        }
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn generate(
        &self,
        endpoint: DesignEndpoint,
        form: GenerationForm,
    ) -> Result<GenerationResponse, UpstreamError> {
        let url = format!("{}{}", self.base_url, endpoint.path());
        debug!(
            endpoint = %url,
            image_bytes = form.image.len(),
            prompt = %form.prompt,
            "Sending generation request"
        );
        let response = self
            .client
            .post(&url)
            .multipart(form.into_multipart()?)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;
        let response = assert_ok_response(response).await?;
        response
            .json::<GenerationResponse>()
            .await
            .map_err(UpstreamError::Decode)
    }

    /// Whether the service answers its health probe with a 2xx.
    pub async fn is_healthy(&self) -> bool {
        let probe = self
            .client
            .get(format!("{}/health", self.base_url))
            .timeout(self.health_timeout)
            .send()
            .await;
        match probe {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!("Design service health probe failed: {err}");
                false
            }
        }
    }
}

async fn assert_ok_response(response: reqwest::Response) -> Result<reqwest::Response, UpstreamError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    error!("Design service error: {status} {body}");
    Err(UpstreamError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_follows_settings_presence() {
        assert_eq!(DesignEndpoint::for_settings(&SettingsMap::new()), DesignEndpoint::Basic);
        let mut settings = SettingsMap::new();
        settings.insert("steps".into(), json!(30));
        assert_eq!(DesignEndpoint::for_settings(&settings), DesignEndpoint::Advanced);
        assert_eq!(DesignEndpoint::Variations.path(), "/generate/variations");
    }

    #[test]
    fn base_url_is_normalized() {
        let client = DesignServiceClient::new(" http://localhost:8000/ ");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let parsed: GenerationResponse = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert!(!parsed.success);
        assert!(parsed.output.is_empty());
        assert_eq!(parsed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn status_error_folds_in_upstream_detail() {
        let err = UpstreamError::Status { status: 502, body: "bad gateway".into() };
        assert_eq!(err.to_string(), "design service error: 502 - bad gateway");
    }
}
