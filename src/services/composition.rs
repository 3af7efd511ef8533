//! Joins parent content rows with their translation in a requested
//! language and the catalog rows they reference, one page at a time.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use crate::database::models::{
    Attachment, CatalogEntry, EducationTranslation, ExperienceTranslation, Language, LanguageTranslation,
    ProjectTranslation, SkillTranslation, User, UserEducation, UserExperience, UserLanguage, UserPosition,
    UserProject, UserSkill,
};
use crate::database::{Repository, Store, Table};
use crate::filter::FilterData;
use crate::storage::RequestOrigin;

use super::pagination::{Page, PageRequest};
use super::translations::TranslationFamily;
use super::views::{
    AttachmentView, EducationView, ExperienceView, LanguageView, PositionView, ProjectDetailView, ProjectView,
    PublicProfileView, SkillView,
};
use super::{ServiceError, ServiceResult};

/// Rows indexed by the id they are joined on.
trait JoinKey {
    fn join_key(&self) -> i64;
}

impl JoinKey for CatalogEntry {
    fn join_key(&self) -> i64 {
        self.id
    }
}

impl JoinKey for Language {
    fn join_key(&self) -> i64 {
        self.id
    }
}

impl JoinKey for SkillTranslation {
    fn join_key(&self) -> i64 {
        self.skill_id
    }
}

impl JoinKey for ExperienceTranslation {
    fn join_key(&self) -> i64 {
        self.user_experience_id
    }
}

impl JoinKey for EducationTranslation {
    fn join_key(&self) -> i64 {
        self.user_education_id
    }
}

impl JoinKey for LanguageTranslation {
    fn join_key(&self) -> i64 {
        self.user_language_id
    }
}

impl JoinKey for ProjectTranslation {
    fn join_key(&self) -> i64 {
        self.user_project_id
    }
}

fn index<T: JoinKey>(rows: Vec<T>) -> HashMap<i64, T> {
    rows.into_iter().map(|row| (row.join_key(), row)).collect()
}

/// Public, read-only views of a user's portfolio.
pub struct CompositionService {
    store: Arc<dyn Store>,
    users: Repository<User>,
}

impl CompositionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            users: Repository::new(Table::Users, store.clone()),
            store,
        }
    }

    fn repo<T: DeserializeOwned + Send>(&self, table: Table) -> Repository<T> {
        Repository::new(table, self.store.clone())
    }

    async fn resolve_user(&self, username: &str) -> ServiceResult<User> {
        self.users
            .select_one(FilterData::matching(json!({ "username": username })))
            .await?
            .ok_or_else(|| ServiceError::NotFound("Username not found".to_string()))
    }

    /// Active parent rows of `user_id` plus any extra column filters, one page in id order.
    async fn parents<P: DeserializeOwned + Send>(
        &self,
        table: Table,
        user_id: i64,
        extra: Map<String, Value>,
        request: PageRequest,
    ) -> ServiceResult<Page<P>> {
        let mut where_clause = Map::new();
        where_clause.insert("user_id".to_string(), json!(user_id));
        where_clause.insert("is_active".to_string(), json!(true));
        where_clause.extend(extra);
        let where_clause = Value::Object(where_clause);

        let parents = self.repo::<P>(table);
        let total_count = parents.count(FilterData::matching(where_clause.clone())).await?;
        let items = parents.select_any(request.apply(FilterData::matching(where_clause))).await?;
        Ok(Page::new(items, request, total_count))
    }

    /// Translations of `parent_ids` into `language_id`, keyed by parent id.
    async fn translations<T: DeserializeOwned + Send + JoinKey>(
        &self,
        family: &TranslationFamily,
        parent_ids: &[i64],
        language_id: Option<i64>,
    ) -> ServiceResult<HashMap<i64, T>> {
        let Some(language_id) = language_id else {
            return Ok(HashMap::new());
        };
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut where_clause = Map::new();
        where_clause.insert(family.parent_key.to_string(), json!({ "$in": parent_ids }));
        where_clause.insert("language_id".to_string(), json!(language_id));

        let rows = self
            .repo::<T>(family.table)
            .select_any(FilterData::matching(Value::Object(where_clause)))
            .await?;
        Ok(index(rows))
    }

    async fn catalog<T: DeserializeOwned + Send + JoinKey>(
        &self,
        table: Table,
        ids: impl IntoIterator<Item = i64>,
    ) -> ServiceResult<HashMap<i64, T>> {
        let mut ids: Vec<i64> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(index(self.repo::<T>(table).select_in("id", &ids).await?))
    }

    pub async fn skills(
        &self,
        username: &str,
        language_id: Option<i64>,
        request: PageRequest,
        origin: &RequestOrigin,
    ) -> ServiceResult<Page<SkillView>> {
        let user = self.resolve_user(username).await?;
        let page: Page<UserSkill> = self.parents(Table::UserSkills, user.id, Map::new(), request).await?;

        let ids: Vec<i64> = page.items.iter().map(|p| p.skill_id).collect();
        let translations: HashMap<i64, SkillTranslation> =
            self.translations(&TranslationFamily::SKILL, &ids, language_id).await?;
        let skills: HashMap<i64, CatalogEntry> = self.catalog(Table::Skills, ids).await?;

        Ok(page.map(|parent| {
            let skill_id = parent.skill_id;
            SkillView::new(parent, translations.get(&skill_id), skills.get(&skill_id), origin)
        }))
    }

    pub async fn experiences(
        &self,
        username: &str,
        language_id: Option<i64>,
        request: PageRequest,
        origin: &RequestOrigin,
    ) -> ServiceResult<Page<ExperienceView>> {
        let user = self.resolve_user(username).await?;
        let page: Page<UserExperience> = self
            .parents(Table::UserExperiences, user.id, Map::new(), request)
            .await?;

        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        let translations: HashMap<i64, ExperienceTranslation> =
            self.translations(&TranslationFamily::EXPERIENCE, &ids, language_id).await?;
        let companies: HashMap<i64, CatalogEntry> = self
            .catalog(Table::Companies, page.items.iter().map(|p| p.company_id))
            .await?;

        Ok(page.map(|parent| {
            let (id, company_id) = (parent.id, parent.company_id);
            ExperienceView::new(parent, translations.get(&id), companies.get(&company_id), origin)
        }))
    }

    pub async fn educations(
        &self,
        username: &str,
        language_id: Option<i64>,
        request: PageRequest,
        origin: &RequestOrigin,
    ) -> ServiceResult<Page<EducationView>> {
        let user = self.resolve_user(username).await?;
        let page: Page<UserEducation> = self
            .parents(Table::UserEducations, user.id, Map::new(), request)
            .await?;

        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        let translations: HashMap<i64, EducationTranslation> =
            self.translations(&TranslationFamily::EDUCATION, &ids, language_id).await?;
        let schools: HashMap<i64, CatalogEntry> = self
            .catalog(Table::Schools, page.items.iter().map(|p| p.school_id))
            .await?;

        Ok(page.map(|parent| {
            let (id, school_id) = (parent.id, parent.school_id);
            EducationView::new(parent, translations.get(&id), schools.get(&school_id), origin)
        }))
    }

    /// Projects, optionally narrowed to one platform. The filter applies to the count too.
    pub async fn projects(
        &self,
        username: &str,
        language_id: Option<i64>,
        project_platform_id: Option<i64>,
        request: PageRequest,
        origin: &RequestOrigin,
    ) -> ServiceResult<Page<ProjectView>> {
        let user = self.resolve_user(username).await?;
        let mut extra = Map::new();
        if let Some(platform) = project_platform_id {
            extra.insert("project_platform_id".to_string(), json!(platform));
        }
        let page: Page<UserProject> = self.parents(Table::UserProjects, user.id, extra, request).await?;

        let ids: Vec<i64> = page.items.iter().map(|p| p.id).collect();
        let translations: HashMap<i64, ProjectTranslation> =
            self.translations(&TranslationFamily::PROJECT, &ids, language_id).await?;
        let platforms: HashMap<i64, CatalogEntry> = self
            .catalog(Table::ProjectPlatforms, page.items.iter().map(|p| p.project_platform_id))
            .await?;

        Ok(page.map(|parent| {
            let (id, platform_id) = (parent.id, parent.project_platform_id);
            ProjectView::new(parent, translations.get(&id), platforms.get(&platform_id), origin)
        }))
    }

    pub async fn project_detail(
        &self,
        username: &str,
        slug: &str,
        language_id: Option<i64>,
        origin: &RequestOrigin,
    ) -> ServiceResult<ProjectDetailView> {
        let user = self.resolve_user(username).await?;
        let project: UserProject = self
            .repo(Table::UserProjects)
            .select_404(FilterData::matching(
                json!({ "user_id": user.id, "slug": slug, "is_active": true }),
            ))
            .await?;

        let mut translations: HashMap<i64, ProjectTranslation> = self
            .translations(&TranslationFamily::PROJECT, &[project.id], language_id)
            .await?;
        let platforms: HashMap<i64, CatalogEntry> = self
            .catalog(Table::ProjectPlatforms, [project.project_platform_id])
            .await?;
        let attachments: Vec<Attachment> = self
            .repo(Table::UserProjectAttachments)
            .select_in("user_project_id", &[project.id])
            .await?;

        let translation = translations.remove(&project.id);
        let platform = platforms.get(&project.project_platform_id);
        Ok(ProjectDetailView {
            project: ProjectView::new(project, translation.as_ref(), platform, origin),
            attachments: attachments
                .into_iter()
                .map(|a| AttachmentView::new(a, origin))
                .collect(),
        })
    }

    /// The user's identity with active positions, attachments and spoken languages.
    pub async fn profile(
        &self,
        username: &str,
        language_id: Option<i64>,
        origin: &RequestOrigin,
    ) -> ServiceResult<PublicProfileView> {
        let user = self.resolve_user(username).await?;
        let user_id = user.id;

        let positions: Vec<UserPosition> = self
            .repo(Table::UserPositions)
            .select_any(FilterData::matching(json!({ "user_id": user_id, "is_active": true })).order_by("id asc"))
            .await?;
        let attachments: Vec<Attachment> = self
            .repo(Table::UserAttachments)
            .select_in("user_id", &[user_id])
            .await?;
        let user_languages: Vec<UserLanguage> = self
            .repo(Table::UserLanguages)
            .select_any(FilterData::matching(json!({ "user_id": user_id, "is_active": true })).order_by("id asc"))
            .await?;

        let ids: Vec<i64> = user_languages.iter().map(|l| l.id).collect();
        let translations: HashMap<i64, LanguageTranslation> =
            self.translations(&TranslationFamily::LANGUAGE, &ids, language_id).await?;
        let languages: HashMap<i64, Language> = self
            .catalog(Table::Languages, user_languages.iter().map(|l| l.language_id))
            .await?;

        let mut view = PublicProfileView::new(user);
        view.positions = positions.into_iter().map(PositionView::from).collect();
        view.attachments = attachments
            .into_iter()
            .map(|a| AttachmentView::new(a, origin))
            .collect();
        view.languages = user_languages
            .into_iter()
            .map(|parent| {
                let (id, language_id) = (parent.id, parent.language_id);
                LanguageView::new(parent, translations.get(&id), languages.get(&language_id), origin)
            })
            .collect();
        Ok(view)
    }
}
