use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceTranslation {
    pub id: i64,
    pub user_experience_id: i64,
    pub language_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub location_type: String,
    pub industry: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationTranslation {
    pub id: i64,
    pub user_education_id: i64,
    pub language_id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub location_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageTranslation {
    pub id: i64,
    pub user_language_id: i64,
    pub language_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectTranslation {
    pub id: i64,
    pub user_project_id: i64,
    pub language_id: i64,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
