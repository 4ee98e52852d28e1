use std::path::PathBuf;

use anyhow::{Result, anyhow, bail};
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const APP_DIR_NAME: &str = "interior-design";

/// Server settings resolved from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the external image-generation service.
    pub design_api_url: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub database_url: Option<String>,
    /// Optional path segment guarding the MCP endpoint.
    pub secret_key: Option<String>,
    pub owner_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let raw_api_url = non_empty("DESIGN_API_URL")
            .ok_or_else(|| anyhow!("DESIGN_API_URL must point at the image generation service"))?;
        let design_api_url = validate_http_url(&raw_api_url)?
            .as_str()
            .trim_end_matches('/')
            .to_string();

        let port = match non_empty("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|err| anyhow!("invalid PORT {value:?}: {err}"))?,
            None => DEFAULT_PORT,
        };

        let data_dir = non_empty("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            design_api_url,
            port,
            data_dir,
            database_url: non_empty("DATABASE_URL"),
            secret_key: non_empty("SECRET_KEY"),
            owner_secret: non_empty("OWNER_SECRET"),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn mcp_path(&self) -> String {
        match self.secret_key.as_deref() {
            Some(value) => format!("/{value}/mcp"),
            None => "/mcp".to_string(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base
}

pub fn validate_http_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("url must not be empty");
    }
    let parsed = Url::parse(trimmed).map_err(|err| anyhow!("invalid url {trimmed:?}: {err}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => bail!("only http or https urls are allowed, got {scheme}"),
    }
}
