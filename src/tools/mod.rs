pub mod design_room;
pub mod generate_variations;
pub mod list_history;

use rmcp::{ErrorData as McpError, model::{CallToolResult, Content}};
use serde::Serialize;

use crate::error::AppError;

#[derive(Serialize)]
pub struct ToolResponse {
    pub url: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

impl ToolResponse {
    /// Generated images are data URIs or remote URLs; only the former carry a type.
    pub fn for_image(url: String, name: &str, text: String) -> Self {
        let mime_type = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|mime| !mime.is_empty())
            .unwrap_or("image/png")
            .to_string();
        Self {
            url,
            name: name.to_string(),
            mime_type,
            text,
        }
    }
}

pub(crate) fn to_mcp_error(err: AppError) -> McpError {
    match err {
        AppError::Validation(message) | AppError::Unauthorized(message) => {
            McpError::invalid_params(message, None)
        }
        other => McpError::internal_error(
            "design request failed",
            Some(serde_json::Value::String(other.public_message())),
        ),
    }
}

pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string(value).map_err(|err| {
        McpError::internal_error(
            "serialize tool response failed",
            Some(serde_json::Value::String(err.to_string())),
        )
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

pub use design_room::{DesignRoomRequest, design_room};
pub use generate_variations::{GenerateVariationsRequest, generate_variations};
pub use list_history::{ListHistoryRequest, list_history};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_comes_from_data_uris() {
        let response = ToolResponse::for_image(
            "data:image/webp;base64,AAAA".into(),
            "interior-design",
            "done".into(),
        );
        assert_eq!(response.mime_type, "image/webp");

        let remote = ToolResponse::for_image("https://example.com/x".into(), "n", "t".into());
        assert_eq!(remote.mime_type, "image/png");
    }

    #[test]
    fn validation_errors_become_invalid_params() {
        let err = to_mcp_error(AppError::Validation("image, theme and room are required".into()));
        assert_eq!(err.message, "image, theme and room are required");
    }
}
