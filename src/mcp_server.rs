use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::AppState;
use crate::tools::{DesignRoomRequest, GenerateVariationsRequest, ListHistoryRequest};

#[derive(Clone)]
pub struct DesignServer {
    tool_router: ToolRouter<Self>,
    state: AppState,
}

impl DesignServer {
    pub fn new(state: AppState) -> Self {
        Self {
            tool_router: Self::tool_router(),
            state,
        }
    }
}

#[tool_router]
impl DesignServer {
    #[tool(
        description = "Restyle a room photo. Takes the photo as a base64 data URI plus a style (theme) and room type; returns the generated design. Generation can take a few minutes."
    )]
    async fn design_room(
        &self,
        Parameters(request): Parameters<DesignRoomRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::design_room(&self.state, Parameters(request)).await
    }

    #[tool(
        description = "Generate several alternative designs (1 to 5, default 3) of the same room photo in one call."
    )]
    async fn generate_variations(
        &self,
        Parameters(request): Parameters<GenerateVariationsRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::generate_variations(&self.state, Parameters(request)).await
    }

    #[tool(description = "List saved designs for an owner id, newest first.")]
    async fn list_history(
        &self,
        Parameters(request): Parameters<ListHistoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        crate::tools::list_history(&self.state, Parameters(request)).await
    }
}

#[tool_handler]
impl ServerHandler for DesignServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Interior design generator. Send room photos as data URIs; results are image URLs or data URIs."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
