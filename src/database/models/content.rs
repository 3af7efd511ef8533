use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSkill {
    pub id: i64,
    pub user_id: i64,
    pub skill_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserExperience {
    pub id: i64,
    pub user_id: i64,
    pub company_id: i64,
    pub month_start: i32,
    pub month_end: Option<i32>,
    pub year_start: i32,
    pub year_end: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEducation {
    pub id: i64,
    pub user_id: i64,
    pub school_id: i64,
    pub month_start: i32,
    pub month_end: Option<i32>,
    pub year_start: i32,
    pub year_end: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLanguage {
    pub id: i64,
    pub user_id: i64,
    pub language_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPosition {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProject {
    pub id: i64,
    pub user_id: i64,
    pub project_platform_id: i64,
    pub slug: String,
    pub image_url: String,
    pub project_created_at: Option<DateTime<Utc>>,
    pub project_updated_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
