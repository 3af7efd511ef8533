use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::database::models::{
    Attachment, UserEducation, UserExperience, UserLanguage, UserPosition, UserProject, UserSkill,
};
use crate::database::{Repository, Row, Store, Table};
use crate::filter::FilterData;
use crate::storage::{dirs, upload_filename, BlobStore, Upload};

use super::guard::ensure_owner;
use super::{required_text, upload_timestamp, ServiceError, ServiceResult};

/// Start and optional end of an experience or education.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Period {
    pub month_start: i32,
    pub month_end: Option<i32>,
    pub year_start: i32,
    pub year_end: Option<i32>,
}

impl Period {
    pub fn validate(&self) -> ServiceResult<()> {
        let month_ok = |m: i32| (1..=12).contains(&m);
        if !month_ok(self.month_start) || self.month_end.is_some_and(|m| !month_ok(m)) {
            return Err(ServiceError::BadRequest("month must be between 1 and 12".to_string()));
        }
        if self.year_start <= 0 || self.year_end.is_some_and(|y| y <= 0) {
            return Err(ServiceError::BadRequest("year must be positive".to_string()));
        }
        if self.month_end.is_some() != self.year_end.is_some() {
            return Err(ServiceError::BadRequest(
                "month_end and year_end must be given together".to_string(),
            ));
        }
        if let (Some(month_end), Some(year_end)) = (self.month_end, self.year_end) {
            if (year_end, month_end) < (self.year_start, self.month_start) {
                return Err(ServiceError::BadRequest("period ends before it starts".to_string()));
            }
        }
        Ok(())
    }

    fn columns(&self) -> Map<String, Value> {
        let mut columns = Map::new();
        columns.insert("month_start".to_string(), json!(self.month_start));
        columns.insert("month_end".to_string(), json!(self.month_end));
        columns.insert("year_start".to_string(), json!(self.year_start));
        columns.insert("year_end".to_string(), json!(self.year_end));
        columns
    }
}

/// A per-user link to a catalog row, unique per (user, catalog row).
#[derive(Debug, Clone, Copy)]
struct ParentKind {
    table: Table,
    catalog: Table,
    catalog_key: &'static str,
}

const SKILL: ParentKind = ParentKind { table: Table::UserSkills, catalog: Table::Skills, catalog_key: "skill_id" };
const EXPERIENCE: ParentKind = ParentKind {
    table: Table::UserExperiences,
    catalog: Table::Companies,
    catalog_key: "company_id",
};
const EDUCATION: ParentKind = ParentKind {
    table: Table::UserEducations,
    catalog: Table::Schools,
    catalog_key: "school_id",
};
const LANGUAGE: ParentKind = ParentKind {
    table: Table::UserLanguages,
    catalog: Table::Languages,
    catalog_key: "language_id",
};

#[derive(Debug, Clone)]
pub struct NewProject {
    pub project_platform_id: i64,
    pub slug: String,
    pub project_created_at: Option<String>,
    pub project_updated_at: Option<String>,
    pub image: Option<Upload>,
}

/// Parent content records: the caller's skills, experiences, educations,
/// spoken languages, positions and projects.
pub struct ContentService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    positions: Repository<UserPosition>,
    projects: Repository<UserProject>,
    project_attachments: Repository<Attachment>,
}

impl ContentService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            positions: Repository::new(Table::UserPositions, store.clone()),
            projects: Repository::new(Table::UserProjects, store.clone()),
            project_attachments: Repository::new(Table::UserProjectAttachments, store.clone()),
            store,
            blobs,
        }
    }

    async fn ensure_user(&self, user_id: i64) -> ServiceResult<()> {
        Repository::<Row>::new(Table::Users, self.store.clone()).select_id(user_id).await?;
        Ok(())
    }

    async fn create_parent<T: serde::de::DeserializeOwned + Send>(
        &self,
        kind: ParentKind,
        owner: i64,
        catalog_id: i64,
        mut extra: Map<String, Value>,
    ) -> ServiceResult<T> {
        self.ensure_user(owner).await?;
        Repository::<Row>::new(kind.catalog, self.store.clone())
            .select_id(catalog_id)
            .await?;

        let mut key = Map::new();
        key.insert("user_id".to_string(), json!(owner));
        key.insert(kind.catalog_key.to_string(), json!(catalog_id));

        let parents = Repository::<T>::new(kind.table, self.store.clone());
        if parents.exists(Value::Object(key.clone())).await? {
            return Err(ServiceError::Conflict(format!("{} already exists", kind.table.label())));
        }

        extra.extend(key);
        extra.insert("is_active".to_string(), json!(true));
        let parent = parents.insert(Value::Object(extra)).await?;

        info!(table = %kind.table, user_id = owner, catalog_id, "Created content record");
        Ok(parent)
    }

    /// Deletes the caller's link to `catalog_id`; translations cascade.
    async fn delete_parent(&self, kind: ParentKind, owner: i64, catalog_id: i64) -> ServiceResult<()> {
        let mut key = Map::new();
        key.insert("user_id".to_string(), json!(owner));
        key.insert(kind.catalog_key.to_string(), json!(catalog_id));

        Repository::<Row>::new(kind.table, self.store.clone())
            .delete_404(Value::Object(key))
            .await?;

        info!(table = %kind.table, user_id = owner, catalog_id, "Deleted content record");
        Ok(())
    }

    pub async fn create_skill(&self, owner: i64, skill_id: i64) -> ServiceResult<UserSkill> {
        self.create_parent(SKILL, owner, skill_id, Map::new()).await
    }

    pub async fn delete_skill(&self, owner: i64, skill_id: i64) -> ServiceResult<()> {
        self.delete_parent(SKILL, owner, skill_id).await
    }

    pub async fn create_experience(&self, owner: i64, company_id: i64, period: Period) -> ServiceResult<UserExperience> {
        period.validate()?;
        self.create_parent(EXPERIENCE, owner, company_id, period.columns()).await
    }

    pub async fn delete_experience(&self, owner: i64, company_id: i64) -> ServiceResult<()> {
        self.delete_parent(EXPERIENCE, owner, company_id).await
    }

    pub async fn create_education(&self, owner: i64, school_id: i64, period: Period) -> ServiceResult<UserEducation> {
        period.validate()?;
        self.create_parent(EDUCATION, owner, school_id, period.columns()).await
    }

    pub async fn delete_education(&self, owner: i64, school_id: i64) -> ServiceResult<()> {
        self.delete_parent(EDUCATION, owner, school_id).await
    }

    pub async fn create_language(&self, owner: i64, language_id: i64) -> ServiceResult<UserLanguage> {
        self.create_parent(LANGUAGE, owner, language_id, Map::new()).await
    }

    pub async fn delete_language(&self, owner: i64, language_id: i64) -> ServiceResult<()> {
        self.delete_parent(LANGUAGE, owner, language_id).await
    }

    pub async fn create_position(&self, owner: i64, title: &str) -> ServiceResult<UserPosition> {
        let title = required_text("title", title, 128)?;
        self.ensure_user(owner).await?;
        let position = self
            .positions
            .insert(json!({ "user_id": owner, "title": title, "is_active": true }))
            .await?;
        info!(id = position.id, user_id = owner, "Created user position");
        Ok(position)
    }

    pub async fn delete_position(&self, caller: i64, id: i64) -> ServiceResult<()> {
        let position = self.positions.select_id(id).await?;
        ensure_owner(&position, caller, "user position")?;
        self.positions.delete_404(json!({ "id": id })).await?;
        info!(id, user_id = caller, "Deleted user position");
        Ok(())
    }

    pub async fn create_project(&self, owner: i64, new: NewProject) -> ServiceResult<UserProject> {
        let slug = validate_slug(&new.slug)?;
        let project_created_at = parse_timestamp("project_created_at", new.project_created_at.as_deref())?;
        let project_updated_at = parse_timestamp("project_updated_at", new.project_updated_at.as_deref())?;

        self.ensure_user(owner).await?;
        Repository::<Row>::new(Table::ProjectPlatforms, self.store.clone())
            .select_id(new.project_platform_id)
            .await?;

        if self.projects.exists(json!({ "user_id": owner, "slug": slug })).await? {
            return Err(ServiceError::Conflict("Slug already used".to_string()));
        }

        let upload = new
            .image
            .ok_or_else(|| ServiceError::BadRequest("Failed to get file".to_string()))?;
        let filename = upload_filename(upload_timestamp(), owner, &slug, &upload.filename);
        let image_url = self.blobs.store(dirs::USER_PROJECT, &filename, &upload.bytes).await?;

        let project = self
            .projects
            .insert(json!({
                "user_id": owner,
                "project_platform_id": new.project_platform_id,
                "slug": slug,
                "image_url": image_url,
                "project_created_at": project_created_at,
                "project_updated_at": project_updated_at,
                "is_active": true,
            }))
            .await?;

        info!(id = project.id, user_id = owner, slug = %project.slug, "Created user project");
        Ok(project)
    }

    /// Deletes a project the caller owns together with its uploaded images.
    pub async fn delete_project(&self, caller: i64, id: i64) -> ServiceResult<()> {
        let project = self.projects.select_id(id).await?;
        ensure_owner(&project, caller, "user project")?;

        let mut files = vec![project.image_url.clone()];
        files.extend(
            self.project_attachments
                .select_any(FilterData::matching(json!({ "user_project_id": id })))
                .await?
                .into_iter()
                .filter(|a| !a.is_external_image_url)
                .map(|a| a.image_url),
        );

        self.projects.delete_404(json!({ "id": id })).await?;
        info!(id, user_id = caller, "Deleted user project");

        for file in files.iter().filter(|f| !f.is_empty()) {
            if let Err(e) = self.blobs.remove(file).await {
                warn!(path = %file, error = %e, "Failed to remove uploaded file");
            }
        }
        Ok(())
    }
}

fn validate_slug(value: &str) -> ServiceResult<String> {
    let slug = required_text("slug", value, 128)?;
    let valid = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid || slug.starts_with('-') || slug.ends_with('-') {
        return Err(ServiceError::BadRequest(
            "slug may only contain lowercase letters, digits and '-'".to_string(),
        ));
    }
    Ok(slug)
}

fn parse_timestamp(field: &str, value: Option<&str>) -> ServiceResult<Option<DateTime<Utc>>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| ServiceError::BadRequest(format!("{} must be an RFC 3339 timestamp", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(month_start: i32, year_start: i32, end: Option<(i32, i32)>) -> Period {
        Period {
            month_start,
            year_start,
            month_end: end.map(|(m, _)| m),
            year_end: end.map(|(_, y)| y),
        }
    }

    #[test]
    fn periods_require_valid_months_and_order() {
        assert!(period(1, 2020, None).validate().is_ok());
        assert!(period(3, 2020, Some((2, 2021))).validate().is_ok());
        assert!(period(0, 2020, None).validate().is_err());
        assert!(period(13, 2020, None).validate().is_err());
        assert!(period(5, 2020, Some((4, 2020))).validate().is_err());
        assert!(period(5, 2021, Some((6, 2020))).validate().is_err());
    }

    #[test]
    fn slugs_are_lowercase_words() {
        assert_eq!(validate_slug(" portfolio-api ").unwrap(), "portfolio-api");
        assert!(validate_slug("Portfolio").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("-x").is_err());
    }

    #[test]
    fn timestamps_must_be_rfc3339() {
        assert!(parse_timestamp("t", None).unwrap().is_none());
        assert!(parse_timestamp("t", Some("2024-05-01T10:00:00Z")).unwrap().is_some());
        assert!(parse_timestamp("t", Some("2024-05-01")).is_err());
    }
}
