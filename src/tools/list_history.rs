use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::CallToolResult,
    schemars::JsonSchema,
};
use serde::Deserialize;

use crate::{
    AppState,
    generation,
    tools::{json_result, to_mcp_error},
};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListHistoryRequest {
    #[schemars(description = "Owner id whose history to list")]
    pub user_id: String,
    #[schemars(description = "Maximum number of records, default 10")]
    pub limit: Option<u32>,
}

pub async fn list_history(
    state: &AppState,
    Parameters(request): Parameters<ListHistoryRequest>,
) -> Result<CallToolResult, McpError> {
    let limit = request.limit.unwrap_or(10).max(1) as usize;
    let mut records = generation::list_history(state, Some(request.user_id))
        .await
        .map_err(to_mcp_error)?;
    records.truncate(limit);
    json_result(&records)
}
