use axum::extract::{Extension, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{
    EducationTranslation, ExperienceTranslation, LanguageTranslation, ProjectPlatformTranslation, ProjectTranslation,
    SkillTranslation,
};
use crate::handlers::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::translations::{
    EducationTranslationFields, ExperienceTranslationFields, LanguageTranslationFields, ProjectTranslationFields,
};

#[derive(Debug, Deserialize)]
pub struct SkillTranslationInput {
    pub skill_id: i64,
    pub language_id: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ProjectPlatformTranslationInput {
    pub project_platform_id: i64,
    pub language_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ExperienceTranslationInput {
    pub company_id: i64,
    pub language_id: i64,
    #[serde(flatten)]
    pub fields: ExperienceTranslationFields,
}

#[derive(Debug, Deserialize)]
pub struct EducationTranslationInput {
    pub school_id: i64,
    pub language_id: i64,
    #[serde(flatten)]
    pub fields: EducationTranslationFields,
}

#[derive(Debug, Deserialize)]
pub struct LanguageTranslationInput {
    /// The spoken language the caller listed.
    pub select_language_id: i64,
    pub language_id: i64,
    #[serde(flatten)]
    pub fields: LanguageTranslationFields,
}

#[derive(Debug, Deserialize)]
pub struct ProjectTranslationInput {
    pub user_project_id: i64,
    pub language_id: i64,
    #[serde(flatten)]
    pub fields: ProjectTranslationFields,
}

/// POST /api/v1/skill-translation
pub async fn skill_post(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SkillTranslationInput>,
) -> ApiResult<SkillTranslation> {
    let translation = state
        .catalogs()
        .create_skill_translation(input.skill_id, input.language_id, &input.description)
        .await?;
    Ok(ApiResponse::created(translation))
}

/// DELETE /api/v1/skill-translation/:skill_id/:language_id
pub async fn skill_delete(
    State(state): State<AppState>,
    ApiPath((skill_id, language_id)): ApiPath<(i64, i64)>,
) -> ApiResult<()> {
    state.catalogs().delete_skill_translation(skill_id, language_id).await?;
    Ok(ApiResponse::message_only("Skill translation deleted"))
}

/// POST /api/v1/project-platform-translation
pub async fn project_platform_post(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProjectPlatformTranslationInput>,
) -> ApiResult<ProjectPlatformTranslation> {
    let translation = state
        .catalogs()
        .create_project_platform_translation(
            input.project_platform_id,
            input.language_id,
            &input.title,
            &input.description,
        )
        .await?;
    Ok(ApiResponse::created(translation))
}

/// DELETE /api/v1/project-platform-translation/:project_platform_id/:language_id
pub async fn project_platform_delete(
    State(state): State<AppState>,
    ApiPath((project_platform_id, language_id)): ApiPath<(i64, i64)>,
) -> ApiResult<()> {
    state
        .catalogs()
        .delete_project_platform_translation(project_platform_id, language_id)
        .await?;
    Ok(ApiResponse::message_only("Project platform translation deleted"))
}

/// POST /api/v1/user-experience-translation
pub async fn experience_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<ExperienceTranslationInput>,
) -> ApiResult<ExperienceTranslation> {
    let translation = state
        .translations()
        .create_experience_translation(auth_user.user_id, input.company_id, input.language_id, input.fields)
        .await?;
    Ok(ApiResponse::created(translation))
}

/// DELETE /api/v1/user-experience-translation/:company_id/:language_id
pub async fn experience_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((company_id, language_id)): ApiPath<(i64, i64)>,
) -> ApiResult<()> {
    state
        .translations()
        .delete_experience_translation(auth_user.user_id, company_id, language_id)
        .await?;
    Ok(ApiResponse::message_only("User experience translation deleted"))
}

/// POST /api/v1/user-education-translation
pub async fn education_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<EducationTranslationInput>,
) -> ApiResult<EducationTranslation> {
    let translation = state
        .translations()
        .create_education_translation(auth_user.user_id, input.school_id, input.language_id, input.fields)
        .await?;
    Ok(ApiResponse::created(translation))
}

/// DELETE /api/v1/user-education-translation/:school_id/:language_id
pub async fn education_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((school_id, language_id)): ApiPath<(i64, i64)>,
) -> ApiResult<()> {
    state
        .translations()
        .delete_education_translation(auth_user.user_id, school_id, language_id)
        .await?;
    Ok(ApiResponse::message_only("User education translation deleted"))
}

/// POST /api/v1/user-language-translation
pub async fn language_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<LanguageTranslationInput>,
) -> ApiResult<LanguageTranslation> {
    let translation = state
        .translations()
        .create_language_translation(
            auth_user.user_id,
            input.select_language_id,
            input.language_id,
            input.fields,
        )
        .await?;
    Ok(ApiResponse::created(translation))
}

/// DELETE /api/v1/user-language-translation/:select_language_id/:language_id
pub async fn language_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((select_language_id, language_id)): ApiPath<(i64, i64)>,
) -> ApiResult<()> {
    state
        .translations()
        .delete_language_translation(auth_user.user_id, select_language_id, language_id)
        .await?;
    Ok(ApiResponse::message_only("User language translation deleted"))
}

/// POST /api/v1/user-project-translation
pub async fn project_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<ProjectTranslationInput>,
) -> ApiResult<ProjectTranslation> {
    let translation = state
        .translations()
        .create_project_translation(auth_user.user_id, input.user_project_id, input.language_id, input.fields)
        .await?;
    Ok(ApiResponse::created(translation))
}

/// DELETE /api/v1/user-project-translation/:id
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    state
        .translations()
        .delete_project_translation(auth_user.user_id, id)
        .await?;
    Ok(ApiResponse::message_only("User project translation deleted"))
}
