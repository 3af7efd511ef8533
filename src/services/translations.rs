use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::database::models::{
    EducationTranslation, ExperienceTranslation, LanguageTranslation, ProjectTranslation, UserEducation,
    UserExperience, UserLanguage, UserProject,
};
use crate::database::{Repository, Row, Store, Table};
use crate::filter::FilterData;

use super::guard::ensure_owner;
use super::{optional_text, required_text, ServiceError, ServiceResult};

/// Describes one translation table: where it lives, which parent it
/// translates, and the column holding the parent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationFamily {
    pub table: Table,
    pub parent: Table,
    pub parent_key: &'static str,
}

impl TranslationFamily {
    pub const SKILL: Self = Self {
        table: Table::SkillTranslations,
        parent: Table::Skills,
        parent_key: "skill_id",
    };
    pub const PROJECT_PLATFORM: Self = Self {
        table: Table::ProjectPlatformTranslations,
        parent: Table::ProjectPlatforms,
        parent_key: "project_platform_id",
    };
    pub const EXPERIENCE: Self = Self {
        table: Table::UserExperienceTranslations,
        parent: Table::UserExperiences,
        parent_key: "user_experience_id",
    };
    pub const EDUCATION: Self = Self {
        table: Table::UserEducationTranslations,
        parent: Table::UserEducations,
        parent_key: "user_education_id",
    };
    pub const LANGUAGE: Self = Self {
        table: Table::UserLanguageTranslations,
        parent: Table::UserLanguages,
        parent_key: "user_language_id",
    };
    pub const PROJECT: Self = Self {
        table: Table::UserProjectTranslations,
        parent: Table::UserProjects,
        parent_key: "user_project_id",
    };

    fn key(&self, parent_id: i64, language_id: i64) -> Value {
        let mut key = Map::new();
        key.insert(self.parent_key.to_string(), json!(parent_id));
        key.insert("language_id".to_string(), json!(language_id));
        Value::Object(key)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceTranslationFields {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub location_type: String,
    pub industry: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationTranslationFields {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub location_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageTranslationFields {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTranslationFields {
    pub name: String,
    pub description: String,
}

/// Translation records. Creation validates language, parent and
/// (parent, language) uniqueness; user-scoped families additionally fold
/// the caller into the parent lookup.
pub struct TranslationService {
    store: Arc<dyn Store>,
    experiences: Repository<UserExperience>,
    educations: Repository<UserEducation>,
    user_languages: Repository<UserLanguage>,
    projects: Repository<UserProject>,
}

impl TranslationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            experiences: Repository::new(Table::UserExperiences, store.clone()),
            educations: Repository::new(Table::UserEducations, store.clone()),
            user_languages: Repository::new(Table::UserLanguages, store.clone()),
            projects: Repository::new(Table::UserProjects, store.clone()),
            store,
        }
    }

    fn repo<T: DeserializeOwned + Send>(&self, table: Table) -> Repository<T> {
        Repository::new(table, self.store.clone())
    }

    /// Inserts `fields` as the translation of `parent_id` into `language_id`.
    pub async fn create<T: DeserializeOwned + Send>(
        &self,
        family: &TranslationFamily,
        parent_id: i64,
        language_id: i64,
        fields: Value,
    ) -> ServiceResult<T> {
        self.ensure_language(language_id).await?;
        self.repo::<Row>(family.parent).select_id(parent_id).await?;

        let key = family.key(parent_id, language_id);
        let translations = self.repo::<T>(family.table);
        if translations.exists(key.clone()).await? {
            return Err(ServiceError::Conflict(format!(
                "{} already exists for this language",
                family.table.label()
            )));
        }

        let mut values = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Value::Object(key) = key {
            values.extend(key);
        }

        let translation = translations.insert(Value::Object(values)).await?;
        info!(table = %family.table, parent_id, language_id, "Created translation");
        Ok(translation)
    }

    pub async fn find<T: DeserializeOwned + Send>(
        &self,
        family: &TranslationFamily,
        parent_id: i64,
        language_id: i64,
    ) -> ServiceResult<Option<T>> {
        Ok(self
            .repo::<T>(family.table)
            .select_one(FilterData::matching(family.key(parent_id, language_id)))
            .await?)
    }

    pub async fn delete(&self, family: &TranslationFamily, parent_id: i64, language_id: i64) -> ServiceResult<()> {
        self.repo::<Row>(family.table)
            .delete_404(family.key(parent_id, language_id))
            .await?;
        info!(table = %family.table, parent_id, language_id, "Deleted translation");
        Ok(())
    }

    async fn ensure_language(&self, language_id: i64) -> ServiceResult<()> {
        self.repo::<Row>(Table::Languages).select_id(language_id).await?;
        Ok(())
    }

    async fn owned_experience(&self, caller: i64, company_id: i64) -> ServiceResult<UserExperience> {
        Ok(self
            .experiences
            .select_404(FilterData::matching(json!({ "user_id": caller, "company_id": company_id })))
            .await?)
    }

    async fn owned_education(&self, caller: i64, school_id: i64) -> ServiceResult<UserEducation> {
        Ok(self
            .educations
            .select_404(FilterData::matching(json!({ "user_id": caller, "school_id": school_id })))
            .await?)
    }

    async fn owned_user_language(&self, caller: i64, select_language_id: i64) -> ServiceResult<UserLanguage> {
        Ok(self
            .user_languages
            .select_404(FilterData::matching(
                json!({ "user_id": caller, "language_id": select_language_id }),
            ))
            .await?)
    }

    async fn owned_project(&self, caller: i64, user_project_id: i64) -> ServiceResult<UserProject> {
        let project = self.projects.select_id(user_project_id).await?;
        ensure_owner(&project, caller, "user project")?;
        Ok(project)
    }

    pub async fn create_experience_translation(
        &self,
        caller: i64,
        company_id: i64,
        language_id: i64,
        fields: ExperienceTranslationFields,
    ) -> ServiceResult<ExperienceTranslation> {
        required_text("title", &fields.title, 128)?;
        optional_text("category", &fields.category, 64)?;
        optional_text("location", &fields.location, 128)?;
        optional_text("location_type", &fields.location_type, 64)?;
        optional_text("industry", &fields.industry, 128)?;
        self.ensure_language(language_id).await?;
        let parent = self.owned_experience(caller, company_id).await?;
        self.create(&TranslationFamily::EXPERIENCE, parent.id, language_id, to_fields(&fields))
            .await
    }

    pub async fn delete_experience_translation(&self, caller: i64, company_id: i64, language_id: i64) -> ServiceResult<()> {
        let parent = self.owned_experience(caller, company_id).await?;
        self.delete(&TranslationFamily::EXPERIENCE, parent.id, language_id).await
    }

    pub async fn create_education_translation(
        &self,
        caller: i64,
        school_id: i64,
        language_id: i64,
        fields: EducationTranslationFields,
    ) -> ServiceResult<EducationTranslation> {
        required_text("title", &fields.title, 128)?;
        optional_text("category", &fields.category, 64)?;
        optional_text("location", &fields.location, 128)?;
        optional_text("location_type", &fields.location_type, 64)?;
        self.ensure_language(language_id).await?;
        let parent = self.owned_education(caller, school_id).await?;
        self.create(&TranslationFamily::EDUCATION, parent.id, language_id, to_fields(&fields))
            .await
    }

    pub async fn delete_education_translation(&self, caller: i64, school_id: i64, language_id: i64) -> ServiceResult<()> {
        let parent = self.owned_education(caller, school_id).await?;
        self.delete(&TranslationFamily::EDUCATION, parent.id, language_id).await
    }

    /// `select_language_id` names the spoken language the caller listed;
    /// `language_id` is the language the text is written in.
    pub async fn create_language_translation(
        &self,
        caller: i64,
        select_language_id: i64,
        language_id: i64,
        fields: LanguageTranslationFields,
    ) -> ServiceResult<LanguageTranslation> {
        required_text("title", &fields.title, 128)?;
        self.ensure_language(language_id).await?;
        let parent = self.owned_user_language(caller, select_language_id).await?;
        self.create(&TranslationFamily::LANGUAGE, parent.id, language_id, to_fields(&fields))
            .await
    }

    pub async fn delete_language_translation(
        &self,
        caller: i64,
        select_language_id: i64,
        language_id: i64,
    ) -> ServiceResult<()> {
        let parent = self.owned_user_language(caller, select_language_id).await?;
        self.delete(&TranslationFamily::LANGUAGE, parent.id, language_id).await
    }

    pub async fn create_project_translation(
        &self,
        caller: i64,
        user_project_id: i64,
        language_id: i64,
        fields: ProjectTranslationFields,
    ) -> ServiceResult<ProjectTranslation> {
        required_text("name", &fields.name, 128)?;
        self.ensure_language(language_id).await?;
        let project = self.owned_project(caller, user_project_id).await?;
        self.create(&TranslationFamily::PROJECT, project.id, language_id, to_fields(&fields))
            .await
    }

    /// Project translations are addressed by their own id and guarded through the project.
    pub async fn delete_project_translation(&self, caller: i64, id: i64) -> ServiceResult<()> {
        let translations = self.repo::<ProjectTranslation>(Table::UserProjectTranslations);
        let translation = translations.select_id(id).await?;
        self.owned_project(caller, translation.user_project_id).await?;
        translations.delete_404(json!({ "id": id })).await?;
        info!(id, user_project_id = translation.user_project_id, "Deleted project translation");
        Ok(())
    }
}

fn to_fields<T: Serialize>(fields: &T) -> Value {
    let mut value = serde_json::to_value(fields).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut value {
        for v in map.values_mut() {
            if let Value::String(s) = v {
                *s = s.trim().to_string();
            }
        }
    }
    value
}
