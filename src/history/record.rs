use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One saved design result. Records are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageHistoryRecord {
    pub id: String,
    pub user_id: String,
    /// Remote URL or inline data URI, stored verbatim.
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl ImageHistoryRecord {
    pub fn new(user_id: &str, image_url: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            image_url: image_url.to_string(),
            created_at: Utc::now(),
        }
    }
}
