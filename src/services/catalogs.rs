use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::database::models::{CatalogEntry, Language, ProjectPlatformTranslation, SkillTranslation};
use crate::database::{Repository, Store, Table};
use crate::filter::FilterData;
use crate::storage::{catalog_filename, dirs, BlobStore, Upload};

use super::pagination::{Page, PageRequest};
use super::translations::{TranslationFamily, TranslationService};
use super::{required_text, ServiceError, ServiceResult};

pub const MAX_CODE_CHARS: usize = 5;
pub const MAX_NAME_CHARS: usize = 48;

/// The reference catalogs sharing the [`CatalogEntry`] row shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Skill,
    Company,
    School,
    ProjectPlatform,
}

impl CatalogKind {
    pub fn table(self) -> Table {
        match self {
            CatalogKind::Skill => Table::Skills,
            CatalogKind::Company => Table::Companies,
            CatalogKind::School => Table::Schools,
            CatalogKind::ProjectPlatform => Table::ProjectPlatforms,
        }
    }

    pub fn directory(self) -> &'static str {
        match self {
            CatalogKind::Skill => dirs::SKILL,
            CatalogKind::Company => dirs::COMPANY,
            CatalogKind::School => dirs::SCHOOL,
            CatalogKind::ProjectPlatform => dirs::PROJECT_PLATFORM,
        }
    }

    pub fn label(self) -> &'static str {
        self.table().label()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewCatalogEntry {
    pub code: String,
    pub name: String,
    pub url: String,
    pub is_external_url: bool,
    pub is_external_image_url: bool,
    /// Used instead of an upload when `is_external_image_url` is set.
    pub image_url: String,
    pub address: String,
    pub image: Option<Upload>,
}

#[derive(Debug, Clone, Default)]
pub struct NewLanguage {
    pub code: String,
    pub name: String,
    pub logo: Option<Upload>,
}

/// Reference catalogs: languages, skills, companies, schools and project
/// platforms, plus the catalog-level skill and platform translations.
pub struct CatalogService {
    store: Arc<dyn Store>,
    blobs: Arc<dyn BlobStore>,
    languages: Repository<Language>,
    translations: TranslationService,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            languages: Repository::new(Table::Languages, store.clone()),
            translations: TranslationService::new(store.clone()),
            store,
            blobs,
        }
    }

    fn entries(&self, kind: CatalogKind) -> Repository<CatalogEntry> {
        Repository::new(kind.table(), self.store.clone())
    }

    /// Stores the image and inserts the entry. `name` and `code` must both be unused.
    pub async fn create(&self, kind: CatalogKind, new: NewCatalogEntry) -> ServiceResult<CatalogEntry> {
        let code = validate_code(&new.code)?;
        let name = required_text("name", &new.name, MAX_NAME_CHARS)?;
        let entries = self.entries(kind);

        if entries.exists(json!({ "$or": [{ "name": name }, { "code": code }] })).await? {
            return Err(ServiceError::Conflict("Name or Code already used".to_string()));
        }

        let image_url = match new.image {
            Some(upload) => {
                let filename = catalog_filename(&code, &upload.filename);
                self.blobs.store(kind.directory(), &filename, &upload.bytes).await?
            }
            None if new.is_external_image_url && !new.image_url.trim().is_empty() => {
                new.image_url.trim().to_string()
            }
            None => return Err(ServiceError::BadRequest("Failed to get file".to_string())),
        };

        let entry = entries
            .insert(json!({
                "code": code,
                "name": name,
                "image_url": image_url,
                "url": new.url.trim(),
                "is_external_url": new.is_external_url,
                "is_external_image_url": new.is_external_image_url,
                "address": new.address.trim(),
            }))
            .await?;

        info!(catalog = %kind.table(), id = entry.id, code = %entry.code, "Created catalog entry");
        Ok(entry)
    }

    pub async fn get(&self, kind: CatalogKind, id: i64) -> ServiceResult<CatalogEntry> {
        Ok(self.entries(kind).select_id(id).await?)
    }

    pub async fn list(&self, kind: CatalogKind, request: PageRequest) -> ServiceResult<Page<CatalogEntry>> {
        let entries = self.entries(kind);
        let total_count = entries.count(FilterData::default()).await?;
        let items = entries.select_any(request.apply(FilterData::default())).await?;
        Ok(Page::new(items, request, total_count))
    }

    pub async fn count(&self, kind: CatalogKind) -> ServiceResult<i64> {
        Ok(self.entries(kind).count(FilterData::default()).await?)
    }

    pub async fn create_language(&self, new: NewLanguage) -> ServiceResult<Language> {
        let code = validate_code(&new.code)?;
        let name = required_text("name", &new.name, MAX_NAME_CHARS)?;

        if self.languages.exists(json!({ "$or": [{ "name": name }, { "code": code }] })).await? {
            return Err(ServiceError::Conflict("Name or Code already used".to_string()));
        }

        let upload = new
            .logo
            .ok_or_else(|| ServiceError::BadRequest("Failed to get file".to_string()))?;
        let filename = catalog_filename(&code, &upload.filename);
        let logo_url = self.blobs.store(dirs::LANGUAGE, &filename, &upload.bytes).await?;

        let language = self
            .languages
            .insert(json!({ "code": code, "name": name, "logo_url": logo_url }))
            .await?;

        info!(id = language.id, code = %language.code, "Created language");
        Ok(language)
    }

    pub async fn get_language(&self, id: i64) -> ServiceResult<Language> {
        Ok(self.languages.select_id(id).await?)
    }

    pub async fn list_languages(&self, request: PageRequest) -> ServiceResult<Page<Language>> {
        let total_count = self.languages.count(FilterData::default()).await?;
        let items = self.languages.select_any(request.apply(FilterData::default())).await?;
        Ok(Page::new(items, request, total_count))
    }

    /// A skill and, when `language_id` is given, its description in that language.
    pub async fn skill_detail(
        &self,
        id: i64,
        language_id: Option<i64>,
    ) -> ServiceResult<(CatalogEntry, Option<SkillTranslation>)> {
        let skill = self.get(CatalogKind::Skill, id).await?;
        let translation = match language_id {
            Some(language_id) => {
                self.translations
                    .find::<SkillTranslation>(&TranslationFamily::SKILL, id, language_id)
                    .await?
            }
            None => None,
        };
        Ok((skill, translation))
    }

    pub async fn project_platform_detail(
        &self,
        id: i64,
        language_id: Option<i64>,
    ) -> ServiceResult<(CatalogEntry, Option<ProjectPlatformTranslation>)> {
        let platform = self.get(CatalogKind::ProjectPlatform, id).await?;
        let translation = match language_id {
            Some(language_id) => {
                self.translations
                    .find::<ProjectPlatformTranslation>(&TranslationFamily::PROJECT_PLATFORM, id, language_id)
                    .await?
            }
            None => None,
        };
        Ok((platform, translation))
    }

    pub async fn create_skill_translation(
        &self,
        skill_id: i64,
        language_id: i64,
        description: &str,
    ) -> ServiceResult<SkillTranslation> {
        self.translations
            .create(
                &TranslationFamily::SKILL,
                skill_id,
                language_id,
                json!({ "description": description.trim() }),
            )
            .await
    }

    pub async fn delete_skill_translation(&self, skill_id: i64, language_id: i64) -> ServiceResult<()> {
        self.translations
            .delete(&TranslationFamily::SKILL, skill_id, language_id)
            .await
    }

    pub async fn create_project_platform_translation(
        &self,
        project_platform_id: i64,
        language_id: i64,
        title: &str,
        description: &str,
    ) -> ServiceResult<ProjectPlatformTranslation> {
        let title = required_text("title", title, 128)?;
        self.translations
            .create(
                &TranslationFamily::PROJECT_PLATFORM,
                project_platform_id,
                language_id,
                json!({ "title": title, "description": description.trim() }),
            )
            .await
    }

    pub async fn delete_project_platform_translation(
        &self,
        project_platform_id: i64,
        language_id: i64,
    ) -> ServiceResult<()> {
        self.translations
            .delete(&TranslationFamily::PROJECT_PLATFORM, project_platform_id, language_id)
            .await
    }
}

fn validate_code(value: &str) -> ServiceResult<String> {
    let code = required_text("code", value, MAX_CODE_CHARS)?;
    if code.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
        return Err(ServiceError::BadRequest(
            "code must not contain path separators or control characters".to_string(),
        ));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StoreError;
    use crate::testing::{MemoryBlobStore, MemoryStore};

    fn service() -> (CatalogService, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        (CatalogService::new(Arc::new(MemoryStore::new()), blobs.clone()), blobs)
    }

    fn entry(code: &str, name: &str) -> NewCatalogEntry {
        NewCatalogEntry {
            code: code.to_string(),
            name: name.to_string(),
            image: Some(Upload {
                filename: "logo.svg".to_string(),
                bytes: b"<svg/>".to_vec(),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_stores_the_image_under_the_catalog_directory() {
        let (service, blobs) = service();
        let company = service.create(CatalogKind::Company, entry("ACME", "Acme")).await.unwrap();

        assert_eq!(company.image_url, "assets/images/company/ACME.svg");
        assert!(blobs.contains(&company.image_url));
        assert_eq!(service.count(CatalogKind::Company).await.unwrap(), 1);
        assert_eq!(service.count(CatalogKind::School).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn external_images_skip_storage() {
        let (service, blobs) = service();
        let new = NewCatalogEntry {
            is_external_image_url: true,
            image_url: " https://cdn.example.com/rust.png ".to_string(),
            image: None,
            ..entry("RS", "Rust")
        };
        let skill = service.create(CatalogKind::Skill, new).await.unwrap();

        assert_eq!(skill.image_url, "https://cdn.example.com/rust.png");
        assert_eq!(blobs.stored_count(), 0);
    }

    #[tokio::test]
    async fn invalid_codes_are_rejected() {
        let (service, _) = service();
        for code in ["", "TOOLONG", "a/b", "a\\b", "a\tb"] {
            let err = service.create(CatalogKind::Skill, entry(code, "Name")).await.unwrap_err();
            assert!(matches!(err, ServiceError::BadRequest(_)), "{code}: {err:?}");
        }
    }

    #[tokio::test]
    async fn punctuated_codes_coexist() {
        let (service, blobs) = service();
        let mut paths = Vec::new();
        for (code, name) in [("C", "C"), ("C#", "C Sharp"), ("C++", "C Plus Plus")] {
            let skill = service.create(CatalogKind::Skill, entry(code, name)).await.unwrap();
            assert_eq!(skill.code, code);
            assert!(blobs.contains(&skill.image_url));
            paths.push(skill.image_url);
        }
        assert_eq!(paths, ["assets/images/skill/C.svg", "assets/images/skill/C_23.svg", "assets/images/skill/C_2B_2B.svg"]);
        assert_eq!(blobs.stored_count(), 3);
    }

    #[tokio::test]
    async fn list_pages_in_id_order() {
        let (service, _) = service();
        for n in 0..7 {
            service
                .create(CatalogKind::School, entry(&format!("S{n}"), &format!("School {n}")))
                .await
                .unwrap();
        }

        let page = service
            .list(CatalogKind::School, PageRequest::new(Some(0), Some(-1), 5))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].code, "S0");
        assert_eq!(page.meta().total_page, 2);

        let page = service
            .list(CatalogKind::School, PageRequest::new(Some(5), Some(2), 5))
            .await
            .unwrap();
        let codes: Vec<_> = page.items.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, ["S5", "S6"]);
    }

    #[tokio::test]
    async fn skill_detail_includes_the_requested_translation() {
        let (service, _) = service();
        let language = service
            .create_language(NewLanguage {
                code: "en".to_string(),
                name: "English".to_string(),
                logo: Some(Upload {
                    filename: "en.png".to_string(),
                    bytes: vec![1],
                }),
            })
            .await
            .unwrap();
        let skill = service.create(CatalogKind::Skill, entry("GO", "Golang")).await.unwrap();
        service
            .create_skill_translation(skill.id, language.id, "  Systems language ")
            .await
            .unwrap();

        let (_, translation) = service.skill_detail(skill.id, Some(language.id)).await.unwrap();
        assert_eq!(translation.unwrap().description, "Systems language");

        let (_, translation) = service.skill_detail(skill.id, None).await.unwrap();
        assert!(translation.is_none());

        let err = service
            .create_skill_translation(skill.id, 999, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::NotFound(Table::Languages))));
    }
}
