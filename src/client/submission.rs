use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::client::{ClientError, ImageFile};
use crate::history::ImageHistoryRecord;

/// Upper bound for one design request, upload to response.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
/// Number of variations the client asks for.
pub const CLIENT_VARIATIONS: u32 = 3;

const FALLBACK_REJECTION: &str = "Failed to generate image";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProcessingMode {
    #[default]
    Single,
    Variations,
}

impl ProcessingMode {
    fn path(self) -> &'static str {
        match self {
            Self::Single => "/api/design",
            Self::Variations => "/api/generate/variations",
        }
    }
}

/// One design request as the client sends it.
#[derive(Debug, Clone)]
pub struct DesignSubmission<'a> {
    pub image: &'a str,
    pub theme: &'a str,
    pub room: &'a str,
    pub settings: Option<&'a Value>,
    pub user_id: Option<&'a str>,
    pub mode: ProcessingMode,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DesignPayload<'a> {
    image: &'a str,
    theme: &'a str,
    room: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(rename = "num_variations", skip_serializing_if = "Option::is_none")]
    num_variations: Option<u32>,
}

/// What a successful submission yields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignOutcome {
    pub output_image: String,
    /// Empty in single mode.
    pub variations: Vec<String>,
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn string_items(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn outcome_from_body(body: &Value, mode: ProcessingMode) -> Result<DesignOutcome, ClientError> {
    if !is_truthy(body.get("success")) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(FALLBACK_REJECTION);
        return Err(ClientError::Rejected(message.to_string()));
    }

    match mode {
        ProcessingMode::Variations => {
            let variations = string_items(body.get("variations"));
            let first = variations
                .first()
                .cloned()
                .ok_or_else(|| ClientError::Rejected(FALLBACK_REJECTION.to_string()))?;
            Ok(DesignOutcome {
                output_image: first,
                variations,
            })
        }
        ProcessingMode::Single => {
            let output = string_items(body.get("output"));
            let image = output
                .get(1)
                .or_else(|| output.first())
                .cloned()
                .ok_or_else(|| ClientError::Rejected(FALLBACK_REJECTION.to_string()))?;
            Ok(DesignOutcome {
                output_image: image,
                variations: Vec::new(),
            })
        }
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("application/json"))
}

/// Read a JSON body from an OK response, or classify the failure.
async fn read_json(response: Response) -> Result<Value, ClientError> {
    let status = response.status();
    if !status.is_success() {
        // Error bodies may be JSON without a JSON content type.
        let message = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str::<Value>(&text).ok())
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string));
        return Err(ClientError::Http {
            status: status.as_u16(),
            message,
        });
    }
    if !is_json(&response) {
        return Err(ClientError::NonJson);
    }
    response.json::<Value>().await.map_err(ClientError::from_transport)
}

/// HTTP client for the design server's public API.
#[derive(Debug, Clone)]
pub struct DesignClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl DesignClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn submit(&self, submission: &DesignSubmission<'_>) -> Result<DesignOutcome, ClientError> {
        let payload = DesignPayload {
            image: submission.image,
            theme: submission.theme,
            room: submission.room,
            settings: submission.settings,
            user_id: submission.user_id,
            num_variations: (submission.mode == ProcessingMode::Variations)
                .then_some(CLIENT_VARIATIONS),
        };
        let url = self.url(submission.mode.path());
        debug!(%url, theme = submission.theme, room = submission.room, "submitting design");

        let request = async {
            let response = self
                .http
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(ClientError::from_transport)?;
            read_json(response).await
        };
        let body = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| ClientError::Timeout)??;

        outcome_from_body(&body, submission.mode)
    }

    /// Ask the server for a fresh owner id.
    pub async fn register_owner(&self) -> Result<String, ClientError> {
        let response = self
            .http
            .post(self.url("/api/owners"))
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let body = read_json(response).await?;
        body.get("userId")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ClientError::Unexpected("owner response has no userId".to_string()))
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<ImageHistoryRecord>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/images"))
            .query(&[("userId", user_id)])
            .send()
            .await
            .map_err(ClientError::from_transport)?;
        let mut body = read_json(response).await?;
        let data = body.get_mut("data").map(Value::take).unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|err| ClientError::Unexpected(err.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Uploading,
    Ready,
    Submitting,
    Succeeded,
    Failed(ClientError),
}

/// Single-image workflow: pick a file, encode it, submit it.
#[derive(Debug, Default)]
pub struct DesignSession {
    state: SubmissionState,
    file: Option<ImageFile>,
    data_uri: Option<String>,
    error: Option<ClientError>,
    output_image: Option<String>,
    variations: Vec<String>,
}

impl DesignSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a candidate file. An invalid one only records the error.
    pub fn select_file(&mut self, file: ImageFile) -> Result<(), ClientError> {
        if let Err(err) = file.validate() {
            warn!(name = %file.name, error = %err, "rejected image");
            self.error = Some(err.clone());
            return Err(err);
        }
        self.file = Some(file);
        self.data_uri = None;
        self.output_image = None;
        self.variations.clear();
        self.error = None;
        self.state = SubmissionState::Uploading;
        Ok(())
    }

    /// Encode the selected file; Uploading becomes Ready.
    pub async fn finish_encoding(&mut self) -> Result<(), ClientError> {
        let Some(file) = &self.file else {
            self.error = Some(ClientError::NoImage);
            return Err(ClientError::NoImage);
        };
        match file.read_data_uri().await {
            Ok(data_uri) => {
                self.data_uri = Some(data_uri);
                self.state = SubmissionState::Ready;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.clone());
                self.state = SubmissionState::Failed(err.clone());
                Err(err)
            }
        }
    }

    pub async fn load(&mut self, file: ImageFile) -> Result<(), ClientError> {
        self.select_file(file)?;
        self.finish_encoding().await
    }

    pub fn remove_image(&mut self) {
        self.file = None;
        self.data_uri = None;
        self.output_image = None;
        self.variations.clear();
        self.error = None;
        self.state = SubmissionState::Idle;
    }

    pub async fn submit(
        &mut self,
        client: &DesignClient,
        theme: &str,
        room: &str,
        settings: Option<&Value>,
        user_id: Option<&str>,
        mode: ProcessingMode,
    ) -> Result<DesignOutcome, ClientError> {
        let Some(image) = self.data_uri.clone() else {
            self.error = Some(ClientError::NoImage);
            return Err(ClientError::NoImage);
        };

        self.state = SubmissionState::Submitting;
        self.error = None;
        let submission = DesignSubmission {
            image: &image,
            theme,
            room,
            settings,
            user_id,
            mode,
        };
        match client.submit(&submission).await {
            Ok(outcome) => {
                info!(theme, room, variations = outcome.variations.len(), "design ready");
                self.output_image = Some(outcome.output_image.clone());
                self.variations = outcome.variations.clone();
                self.state = SubmissionState::Succeeded;
                Ok(outcome)
            }
            Err(err) => {
                if let ClientError::Unexpected(detail) = &err {
                    warn!(%detail, "design request failed");
                }
                self.error = Some(err.clone());
                self.state = SubmissionState::Failed(err.clone());
                Err(err)
            }
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn file(&self) -> Option<&ImageFile> {
        self.file.as_ref()
    }

    pub fn data_uri(&self) -> Option<&str> {
        self.data_uri.as_deref()
    }

    pub fn error(&self) -> Option<&ClientError> {
        self.error.as_ref()
    }

    pub fn output_image(&self) -> Option<&str> {
        self.output_image.as_deref()
    }

    pub fn variations(&self) -> &[String] {
        &self.variations
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn single_mode_prefers_the_generated_slot() {
        let body = json!({"success": true, "output": ["original", "generated"]});
        let outcome = outcome_from_body(&body, ProcessingMode::Single).unwrap();
        assert_eq!(outcome.output_image, "generated");
        assert!(outcome.variations.is_empty());

        let body = json!({"success": true, "output": ["only"]});
        let outcome = outcome_from_body(&body, ProcessingMode::Single).unwrap();
        assert_eq!(outcome.output_image, "only");
    }

    #[test]
    fn variations_mode_mirrors_the_first_variation() {
        let body = json!({"success": true, "variations": ["a", "b", "c"]});
        let outcome = outcome_from_body(&body, ProcessingMode::Variations).unwrap();
        assert_eq!(outcome.output_image, "a");
        assert_eq!(outcome.variations, vec!["a", "b", "c"]);
    }

    #[test]
    fn falsy_success_is_a_rejection() {
        let body = json!({"success": false, "error": "quota exhausted"});
        assert_eq!(
            outcome_from_body(&body, ProcessingMode::Single),
            Err(ClientError::Rejected("quota exhausted".to_string()))
        );
        let body = json!({"output": ["a", "b"]});
        assert_eq!(
            outcome_from_body(&body, ProcessingMode::Single),
            Err(ClientError::Rejected("Failed to generate image".to_string()))
        );
    }

    #[tokio::test]
    async fn submitting_without_an_image_records_an_error() {
        let mut session = DesignSession::new();
        let client = DesignClient::new("http://127.0.0.1:9");
        let err = session
            .submit(&client, "Modern", "Living Room", None, None, ProcessingMode::Single)
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::NoImage);
        assert_eq!(session.error(), Some(&ClientError::NoImage));
        assert_eq!(session.state(), &SubmissionState::Idle);
    }

    #[tokio::test]
    async fn invalid_selection_keeps_the_current_state() {
        let mut session = DesignSession::new();
        let png = ImageFile::from_bytes("room.png", vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        session.load(png).await.unwrap();
        assert_eq!(session.state(), &SubmissionState::Ready);
        assert!(session.data_uri().unwrap().starts_with("data:image/png;base64,"));

        let text = ImageFile::from_bytes("notes.txt", b"hello".to_vec());
        assert_eq!(session.select_file(text), Err(ClientError::InvalidFileType));
        assert_eq!(session.state(), &SubmissionState::Ready);
        assert_eq!(session.file().unwrap().name, "room.png");

        session.remove_image();
        assert_eq!(session.state(), &SubmissionState::Idle);
        assert!(session.data_uri().is_none());
    }
}
