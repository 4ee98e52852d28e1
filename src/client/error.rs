use thiserror::Error;

/// Failures of the client workflow. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Please upload a valid image file.")]
    InvalidFileType,
    #[error("Please upload an image less than 10MB.")]
    FileTooLarge,
    #[error("Please upload an image.")]
    NoImage,
    #[error("Batch is limited to {0} images.")]
    BatchFull(usize),
    #[error("{}", http_message(.status, .message))]
    Http {
        status: u16,
        /// `error` field of the server's JSON body, when it sent one.
        message: Option<String>,
    },
    #[error("Server error. Please try again later.")]
    NonJson,
    /// The server answered but reported `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("Request timed out. The image processing is taking too long. Please try again.")]
    Timeout,
    #[error("Network error. Please check your internet connection and try again.")]
    Network,
    #[error("Download failed: {0}")]
    Download(String),
    /// Detail is kept for logs only.
    #[error("Failed to process image. Please try again.")]
    Unexpected(String),
}

fn http_message(status: &u16, message: &Option<String>) -> String {
    if let Some(message) = message.as_deref().filter(|message| !message.trim().is_empty()) {
        return message.to_string();
    }
    match status {
        402 | 429 => "Rate limit exceeded. Please wait a few minutes and try again.".to_string(),
        401 => "Authentication error. Please sign in again and retry.".to_string(),
        403 => "Access denied. Please try again later.".to_string(),
        503 => "AI service temporarily unavailable. Please try again in a moment.".to_string(),
        400 => "Invalid request. Please check your image and try again.".to_string(),
        other => format!("Service error! status: {other}. Please try again."),
    }
}

impl ClientError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() || err.is_request() {
            Self::Network
        } else {
            Self::Unexpected(err.to_string())
        }
    }
}
