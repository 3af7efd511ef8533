//! Response projections. Each constructor takes the parent row plus the
//! optional translation and catalog rows it was joined with; missing
//! joined rows coalesce to empty strings and `false`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::{
    Attachment, CatalogEntry, EducationTranslation, ExperienceTranslation, Language, LanguageTranslation,
    ProjectPlatformTranslation, ProjectTranslation, SkillTranslation, User, UserEducation, UserExperience,
    UserLanguage, UserPosition, UserProject, UserSkill,
};
use crate::storage::{absolute_url, RequestOrigin};

/// Catalog columns flattened into content projections.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CatalogSummary {
    pub code: String,
    pub name: String,
    pub image_url: String,
    pub url: String,
    pub is_external_url: bool,
    pub is_external_image_url: bool,
}

impl CatalogSummary {
    fn new(entry: Option<&CatalogEntry>, origin: &RequestOrigin) -> Self {
        entry
            .map(|e| Self {
                code: e.code.clone(),
                name: e.name.clone(),
                image_url: absolute_url(&e.image_url, origin),
                url: e.url.clone(),
                is_external_url: e.is_external_url,
                is_external_image_url: e.is_external_image_url,
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogView {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub image_url: String,
    pub url: String,
    pub is_external_url: bool,
    pub is_external_image_url: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogView {
    pub fn new(entry: CatalogEntry, origin: &RequestOrigin) -> Self {
        Self {
            id: entry.id,
            image_url: absolute_url(&entry.image_url, origin),
            code: entry.code,
            name: entry.name,
            url: entry.url,
            is_external_url: entry.is_external_url,
            is_external_image_url: entry.is_external_image_url,
            address: entry.address,
            title: None,
            description: None,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }

    /// A skill with its description; an absent translation still yields `""`.
    pub fn skill(entry: CatalogEntry, translation: Option<SkillTranslation>, origin: &RequestOrigin) -> Self {
        Self {
            description: Some(translation.map(|t| t.description).unwrap_or_default()),
            ..Self::new(entry, origin)
        }
    }

    pub fn project_platform(
        entry: CatalogEntry,
        translation: Option<ProjectPlatformTranslation>,
        origin: &RequestOrigin,
    ) -> Self {
        let (title, description) = translation.map(|t| (t.title, t.description)).unwrap_or_default();
        Self {
            title: Some(title),
            description: Some(description),
            ..Self::new(entry, origin)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageCatalogView {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub logo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LanguageCatalogView {
    pub fn new(language: Language, origin: &RequestOrigin) -> Self {
        Self {
            id: language.id,
            logo_url: absolute_url(&language.logo_url, origin),
            code: language.code,
            name: language.name,
            created_at: language.created_at,
            updated_at: language.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillView {
    pub id: i64,
    pub skill_id: i64,
    #[serde(flatten)]
    pub skill: CatalogSummary,
    pub description: String,
}

impl SkillView {
    pub fn new(
        parent: UserSkill,
        translation: Option<&SkillTranslation>,
        catalog: Option<&CatalogEntry>,
        origin: &RequestOrigin,
    ) -> Self {
        Self {
            id: parent.id,
            skill_id: parent.skill_id,
            skill: CatalogSummary::new(catalog, origin),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExperienceView {
    pub id: i64,
    pub company_id: i64,
    #[serde(flatten)]
    pub company: CatalogSummary,
    pub address: String,
    pub month_start: i32,
    pub month_end: Option<i32>,
    pub year_start: i32,
    pub year_end: Option<i32>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub location_type: String,
    pub industry: String,
}

impl ExperienceView {
    pub fn new(
        parent: UserExperience,
        translation: Option<&ExperienceTranslation>,
        catalog: Option<&CatalogEntry>,
        origin: &RequestOrigin,
    ) -> Self {
        Self {
            id: parent.id,
            company_id: parent.company_id,
            company: CatalogSummary::new(catalog, origin),
            address: catalog.map(|c| c.address.clone()).unwrap_or_default(),
            month_start: parent.month_start,
            month_end: parent.month_end,
            year_start: parent.year_start,
            year_end: parent.year_end,
            title: translation.map(|t| t.title.clone()).unwrap_or_default(),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
            category: translation.map(|t| t.category.clone()).unwrap_or_default(),
            location: translation.map(|t| t.location.clone()).unwrap_or_default(),
            location_type: translation.map(|t| t.location_type.clone()).unwrap_or_default(),
            industry: translation.map(|t| t.industry.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EducationView {
    pub id: i64,
    pub school_id: i64,
    #[serde(flatten)]
    pub school: CatalogSummary,
    pub address: String,
    pub month_start: i32,
    pub month_end: Option<i32>,
    pub year_start: i32,
    pub year_end: Option<i32>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub location_type: String,
}

impl EducationView {
    pub fn new(
        parent: UserEducation,
        translation: Option<&EducationTranslation>,
        catalog: Option<&CatalogEntry>,
        origin: &RequestOrigin,
    ) -> Self {
        Self {
            id: parent.id,
            school_id: parent.school_id,
            school: CatalogSummary::new(catalog, origin),
            address: catalog.map(|c| c.address.clone()).unwrap_or_default(),
            month_start: parent.month_start,
            month_end: parent.month_end,
            year_start: parent.year_start,
            year_end: parent.year_end,
            title: translation.map(|t| t.title.clone()).unwrap_or_default(),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
            category: translation.map(|t| t.category.clone()).unwrap_or_default(),
            location: translation.map(|t| t.location.clone()).unwrap_or_default(),
            location_type: translation.map(|t| t.location_type.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageView {
    pub id: i64,
    pub language_id: i64,
    pub code: String,
    pub name: String,
    pub logo_url: String,
    pub title: String,
    pub description: String,
}

impl LanguageView {
    pub fn new(
        parent: UserLanguage,
        translation: Option<&LanguageTranslation>,
        language: Option<&Language>,
        origin: &RequestOrigin,
    ) -> Self {
        Self {
            id: parent.id,
            language_id: parent.language_id,
            code: language.map(|l| l.code.clone()).unwrap_or_default(),
            name: language.map(|l| l.name.clone()).unwrap_or_default(),
            logo_url: language.map(|l| absolute_url(&l.logo_url, origin)).unwrap_or_default(),
            title: translation.map(|t| t.title.clone()).unwrap_or_default(),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionView {
    pub id: i64,
    pub title: String,
}

impl From<UserPosition> for PositionView {
    fn from(position: UserPosition) -> Self {
        Self {
            id: position.id,
            title: position.title,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentView {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub image_url: String,
    pub url: String,
    pub is_external_url: bool,
    pub is_external_image_url: bool,
}

impl AttachmentView {
    pub fn new(attachment: Attachment, origin: &RequestOrigin) -> Self {
        Self {
            id: attachment.id,
            image_url: absolute_url(&attachment.image_url, origin),
            title: attachment.title,
            category: attachment.category,
            url: attachment.url,
            is_external_url: attachment.is_external_url,
            is_external_image_url: attachment.is_external_image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    pub id: i64,
    pub slug: String,
    pub image_url: String,
    pub name: String,
    pub description: String,
    pub project_platform_id: i64,
    pub platform: CatalogSummary,
    pub project_created_at: Option<DateTime<Utc>>,
    pub project_updated_at: Option<DateTime<Utc>>,
}

impl ProjectView {
    pub fn new(
        parent: UserProject,
        translation: Option<&ProjectTranslation>,
        platform: Option<&CatalogEntry>,
        origin: &RequestOrigin,
    ) -> Self {
        Self {
            id: parent.id,
            image_url: absolute_url(&parent.image_url, origin),
            slug: parent.slug,
            name: translation.map(|t| t.name.clone()).unwrap_or_default(),
            description: translation.map(|t| t.description.clone()).unwrap_or_default(),
            project_platform_id: parent.project_platform_id,
            platform: CatalogSummary::new(platform, origin),
            project_created_at: parent.project_created_at,
            project_updated_at: parent.project_updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetailView {
    #[serde(flatten)]
    pub project: ProjectView,
    pub attachments: Vec<AttachmentView>,
}

/// The public face of a user: identity, active positions, attachments and spoken languages.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfileView {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub positions: Vec<PositionView>,
    pub attachments: Vec<AttachmentView>,
    pub languages: Vec<LanguageView>,
}

impl PublicProfileView {
    pub fn new(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
            positions: vec![],
            attachments: vec![],
            languages: vec![],
        }
    }
}
