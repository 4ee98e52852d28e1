use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::client::{ClientError, DesignClient};

const IDENTITY_DIR: &str = "interior-design";
const IDENTITY_FILE: &str = "owner_id";

/// `<config dir>/interior-design/owner_id`, if the platform has a config dir.
pub fn default_identity_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(IDENTITY_DIR).join(IDENTITY_FILE))
}

pub async fn load_identity(path: &Path) -> Option<String> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;
    let owner = raw.trim();
    (!owner.is_empty()).then(|| owner.to_string())
}

/// Reuse the stored owner id or register a new one with the server and keep it.
pub async fn load_or_register(path: &Path, client: &DesignClient) -> Result<String, ClientError> {
    if let Some(owner) = load_identity(path).await {
        debug!(path = %path.display(), "using stored owner id");
        return Ok(owner);
    }

    let owner = client.register_owner().await?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| ClientError::Unexpected(err.to_string()))?;
    }
    tokio::fs::write(path, format!("{owner}\n"))
        .await
        .map_err(|err| ClientError::Unexpected(err.to_string()))?;
    info!(path = %path.display(), "registered new owner id");
    Ok(owner)
}
