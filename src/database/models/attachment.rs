use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of `user_attachments` (owned through `user_id`) or
/// `user_project_attachments` (owned through `user_project_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_project_id: Option<i64>,
    pub title: String,
    pub category: String,
    pub image_url: String,
    pub url: String,
    pub is_external_url: bool,
    pub is_external_image_url: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
