use axum::extract::{Extension, Multipart, State};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{UserEducation, UserExperience, UserLanguage, UserPosition, UserProject, UserSkill};
use crate::handlers::upload::{UploadForm, IMAGE_FIELD};
use crate::handlers::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::content::{NewProject, Period};

#[derive(Debug, Deserialize)]
pub struct UserSkillInput {
    pub skill_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UserExperienceInput {
    pub company_id: i64,
    #[serde(flatten)]
    pub period: Period,
}

#[derive(Debug, Deserialize)]
pub struct UserEducationInput {
    pub school_id: i64,
    #[serde(flatten)]
    pub period: Period,
}

#[derive(Debug, Deserialize)]
pub struct UserLanguageInput {
    pub language_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UserPositionInput {
    pub title: String,
}

/// POST /api/v1/user-skill
pub async fn skill_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<UserSkillInput>,
) -> ApiResult<UserSkill> {
    let skill = state.content().create_skill(auth_user.user_id, input.skill_id).await?;
    Ok(ApiResponse::created(skill))
}

/// DELETE /api/v1/user-skill/:skill_id
pub async fn skill_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(skill_id): ApiPath<i64>,
) -> ApiResult<()> {
    state.content().delete_skill(auth_user.user_id, skill_id).await?;
    Ok(ApiResponse::message_only("User skill deleted"))
}

/// POST /api/v1/user-experience
pub async fn experience_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<UserExperienceInput>,
) -> ApiResult<UserExperience> {
    let experience = state
        .content()
        .create_experience(auth_user.user_id, input.company_id, input.period)
        .await?;
    Ok(ApiResponse::created(experience))
}

/// DELETE /api/v1/user-experience/:company_id
pub async fn experience_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(company_id): ApiPath<i64>,
) -> ApiResult<()> {
    state.content().delete_experience(auth_user.user_id, company_id).await?;
    Ok(ApiResponse::message_only("User experience deleted"))
}

/// POST /api/v1/user-education
pub async fn education_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<UserEducationInput>,
) -> ApiResult<UserEducation> {
    let education = state
        .content()
        .create_education(auth_user.user_id, input.school_id, input.period)
        .await?;
    Ok(ApiResponse::created(education))
}

/// DELETE /api/v1/user-education/:school_id
pub async fn education_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(school_id): ApiPath<i64>,
) -> ApiResult<()> {
    state.content().delete_education(auth_user.user_id, school_id).await?;
    Ok(ApiResponse::message_only("User education deleted"))
}

/// POST /api/v1/user-language
pub async fn language_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<UserLanguageInput>,
) -> ApiResult<UserLanguage> {
    let language = state
        .content()
        .create_language(auth_user.user_id, input.language_id)
        .await?;
    Ok(ApiResponse::created(language))
}

/// DELETE /api/v1/user-language/:language_id
pub async fn language_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(language_id): ApiPath<i64>,
) -> ApiResult<()> {
    state.content().delete_language(auth_user.user_id, language_id).await?;
    Ok(ApiResponse::message_only("User language deleted"))
}

/// POST /api/v1/user-position
pub async fn position_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(input): ApiJson<UserPositionInput>,
) -> ApiResult<UserPosition> {
    let position = state.content().create_position(auth_user.user_id, &input.title).await?;
    Ok(ApiResponse::created(position))
}

/// DELETE /api/v1/user-position/:id
pub async fn position_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    state.content().delete_position(auth_user.user_id, id).await?;
    Ok(ApiResponse::message_only("User position deleted"))
}

/// POST /api/v1/user-project - multipart `project_platform_id`, `slug`,
/// `project_created_at`, `project_updated_at`, `image_file`
pub async fn project_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<UserProject> {
    let mut form = UploadForm::parse(multipart, state.config.api.max_upload_bytes).await?;
    let new = NewProject {
        project_platform_id: form.int("project_platform_id")?,
        slug: form.text("slug"),
        project_created_at: form.optional_text("project_created_at"),
        project_updated_at: form.optional_text("project_updated_at"),
        image: form.take_file(IMAGE_FIELD),
    };
    let project = state.content().create_project(auth_user.user_id, new).await?;
    Ok(ApiResponse::created(project))
}

/// DELETE /api/v1/user-project/:id
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    state.content().delete_project(auth_user.user_id, id).await?;
    Ok(ApiResponse::message_only("User project deleted"))
}
