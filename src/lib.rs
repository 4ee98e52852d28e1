//! Interior design generator: an HTTP/MCP front for an external image
//! generation service, a per-owner history of results, and the client-side
//! submission workflow.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod generation;
pub mod hash;
pub mod history;
pub mod image_processing;
pub mod logging;
pub mod mcp_server;
pub mod owner;
pub mod presets;
pub mod prompt;
pub mod settings;
pub mod tools;
pub mod upstream;

pub use api::build_router;

use config::AppConfig;
use history::{HistoryError, HistoryStore};
use owner::OwnerTokens;
use upstream::DesignServiceClient;

/// Shared handles for every route and tool call.
#[derive(Clone, Debug)]
pub struct AppState {
    pub upstream: DesignServiceClient,
    pub history: HistoryStore,
    pub owners: OwnerTokens,
}

impl AppState {
    pub fn new(upstream: DesignServiceClient, history: HistoryStore, owners: OwnerTokens) -> Self {
        Self {
            upstream,
            history,
            owners,
        }
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self, HistoryError> {
        let history = HistoryStore::open(config.database_url.as_deref(), &config.data_dir).await?;
        Ok(Self::new(
            DesignServiceClient::new(&config.design_api_url),
            history,
            OwnerTokens::new(config.owner_secret.clone()),
        ))
    }
}
