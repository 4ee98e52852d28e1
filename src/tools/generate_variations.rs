use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::JsonSchema,
};
use serde::Deserialize;

use crate::{
    AppState,
    generation::{self, VariationsRequest},
    tools::{ToolResponse, json_result, to_mcp_error},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateVariationsRequest {
    #[schemars(description = "Room photo as a base64 data URI")]
    pub image: String,
    #[schemars(description = "Design style")]
    pub theme: String,
    #[schemars(description = "Room type")]
    pub room: String,
    #[schemars(description = "Optional generation settings object")]
    pub settings: Option<serde_json::Value>,
    #[schemars(description = "Number of variations, 1 to 5. Defaults to 3")]
    pub num_variations: Option<u32>,
    #[schemars(description = "Owner id; when given every variation is saved to history")]
    pub user_id: Option<String>,
}

pub async fn generate_variations(
    state: &AppState,
    Parameters(request): Parameters<GenerateVariationsRequest>,
) -> Result<CallToolResult, McpError> {
    let response = generation::run_variations(
        state,
        VariationsRequest {
            image: Some(request.image),
            theme: Some(request.theme),
            room: Some(request.room),
            settings: request.settings,
            num_variations: request.num_variations.map(serde_json::Value::from),
            user_id: request.user_id,
        },
    )
    .await
    .map_err(to_mcp_error)?;

    let total = response.num_generated;
    let items: Vec<ToolResponse> = response
        .variations
        .into_iter()
        .enumerate()
        .map(|(index, url)| {
            ToolResponse::for_image(
                url,
                &format!("variation-{}", index + 1),
                format!("Variation {} of {total}", index + 1),
            )
        })
        .collect();
    json_result(&items)
}
