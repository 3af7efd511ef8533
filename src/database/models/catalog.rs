use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub logo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape shared by the skill, company, school and project platform catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub image_url: String,
    pub url: String,
    pub is_external_url: bool,
    pub is_external_image_url: bool,
    /// Postal address; only companies and schools fill it in.
    #[serde(default)]
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTranslation {
    pub id: i64,
    pub skill_id: i64,
    pub language_id: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectPlatformTranslation {
    pub id: i64,
    pub project_platform_id: i64,
    pub language_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
