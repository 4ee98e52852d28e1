use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::JsonSchema,
};
use serde::Deserialize;

use crate::{
    AppState,
    generation::{self, DesignRequest},
    tools::{ToolResponse, json_result, to_mcp_error},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DesignRoomRequest {
    #[schemars(description = "Room photo as a base64 data URI (data:image/...;base64,...)")]
    pub image: String,
    #[schemars(description = "Design style, e.g. Modern, Traditional, Minimalist, Industrial, Scandinavian, Bohemian")]
    pub theme: String,
    #[schemars(description = "Room type, e.g. Living Room, Bedroom, Kitchen")]
    pub room: String,
    #[schemars(description = "Optional generation settings object (strength, guidanceScale, steps, seed, enableUpscaling, preserveColors, enhanceLighting)")]
    pub settings: Option<serde_json::Value>,
    #[schemars(description = "Owner id; when given the result is saved to that owner's history")]
    pub user_id: Option<String>,
}

pub async fn design_room(
    state: &AppState,
    Parameters(request): Parameters<DesignRoomRequest>,
) -> Result<CallToolResult, McpError> {
    let response = generation::run_design(
        state,
        DesignRequest {
            image: Some(request.image),
            theme: Some(request.theme),
            room: Some(request.room),
            settings: request.settings,
            user_id: request.user_id,
        },
    )
    .await
    .map_err(to_mcp_error)?;

    let generated = response.output.into_iter().nth(1).unwrap_or_default();
    json_result(&ToolResponse::for_image(
        generated,
        "interior-design",
        response.message,
    ))
}
