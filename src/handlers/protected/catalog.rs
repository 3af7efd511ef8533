use axum::extract::{Multipart, State};

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::query::ListQuery;
use crate::handlers::upload::{UploadForm, IMAGE_FIELD};
use crate::handlers::{ApiPath, ApiQuery};
use crate::middleware::{ApiList, ApiListResult, ApiResponse, ApiResult};
use crate::services::catalogs::{NewCatalogEntry, NewLanguage};
use crate::services::views::{CatalogView, LanguageCatalogView};
use crate::services::CatalogKind;
use crate::storage::RequestOrigin;

/// GET /api/v1/language
pub async fn language_list(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<LanguageCatalogView> {
    let page = state
        .catalogs()
        .list_languages(state.page_request(&query))
        .await?
        .non_empty("Language not found")?
        .map(|language| LanguageCatalogView::new(language, &origin));
    Ok(ApiList::from(page))
}

/// POST /api/v1/language - multipart `code`, `name`, `image_file`
pub async fn language_post(
    State(state): State<AppState>,
    origin: RequestOrigin,
    multipart: Multipart,
) -> ApiResult<LanguageCatalogView> {
    let mut form = UploadForm::parse(multipart, state.config.api.max_upload_bytes).await?;
    let new = NewLanguage {
        code: form.text("code"),
        name: form.text("name"),
        logo: form.take_file(IMAGE_FIELD),
    };
    let language = state.catalogs().create_language(new).await?;
    Ok(ApiResponse::created(LanguageCatalogView::new(language, &origin)))
}

/// GET /api/v1/language/:id
pub async fn language_get(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<LanguageCatalogView> {
    let language = state.catalogs().get_language(id).await?;
    Ok(ApiResponse::success(LanguageCatalogView::new(language, &origin)))
}

async fn list_entries(
    state: &AppState,
    kind: CatalogKind,
    origin: &RequestOrigin,
    query: &ListQuery,
) -> ApiListResult<CatalogView> {
    let page = state
        .catalogs()
        .list(kind, state.page_request(query))
        .await?
        .non_empty(&format!("{} not found", kind.label()))?
        .map(|entry| CatalogView::new(entry, origin));
    Ok(ApiList::from(page))
}

/// Reads the shared catalog form: `code`, `name`, `url`, `address`,
/// `is_external_url`, `is_external_image_url`, `image_url` and `image_file`.
async fn create_entry(
    state: &AppState,
    kind: CatalogKind,
    origin: &RequestOrigin,
    multipart: Multipart,
) -> ApiResult<CatalogView> {
    let mut form = UploadForm::parse(multipart, state.config.api.max_upload_bytes).await?;
    let new = NewCatalogEntry {
        code: form.text("code"),
        name: form.text("name"),
        url: form.text("url"),
        is_external_url: form.flag("is_external_url"),
        is_external_image_url: form.flag("is_external_image_url"),
        image_url: form.text("image_url"),
        address: form.text("address"),
        image: form.take_file(IMAGE_FIELD),
    };
    let entry = state.catalogs().create(kind, new).await?;
    Ok(ApiResponse::created(CatalogView::new(entry, origin)))
}

pub async fn skill_list(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<CatalogView> {
    list_entries(&state, CatalogKind::Skill, &origin, &query).await
}

pub async fn skill_post(State(state): State<AppState>, origin: RequestOrigin, multipart: Multipart) -> ApiResult<CatalogView> {
    create_entry(&state, CatalogKind::Skill, &origin, multipart).await
}

/// GET /api/v1/skill/:id?language_id= - includes the description in that language
pub async fn skill_get(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<CatalogView> {
    let (skill, translation) = state.catalogs().skill_detail(id, query.language_id()).await?;
    Ok(ApiResponse::success(CatalogView::skill(skill, translation, &origin)))
}

pub async fn company_list(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<CatalogView> {
    list_entries(&state, CatalogKind::Company, &origin, &query).await
}

pub async fn company_post(State(state): State<AppState>, origin: RequestOrigin, multipart: Multipart) -> ApiResult<CatalogView> {
    create_entry(&state, CatalogKind::Company, &origin, multipart).await
}

pub async fn company_get(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<CatalogView> {
    let company = state.catalogs().get(CatalogKind::Company, id).await?;
    Ok(ApiResponse::success(CatalogView::new(company, &origin)))
}

pub async fn school_list(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<CatalogView> {
    list_entries(&state, CatalogKind::School, &origin, &query).await
}

pub async fn school_post(State(state): State<AppState>, origin: RequestOrigin, multipart: Multipart) -> ApiResult<CatalogView> {
    create_entry(&state, CatalogKind::School, &origin, multipart).await
}

pub async fn school_get(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<CatalogView> {
    let school = state.catalogs().get(CatalogKind::School, id).await?;
    Ok(ApiResponse::success(CatalogView::new(school, &origin)))
}

pub async fn project_platform_list(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<CatalogView> {
    list_entries(&state, CatalogKind::ProjectPlatform, &origin, &query).await
}

pub async fn project_platform_post(
    State(state): State<AppState>,
    origin: RequestOrigin,
    multipart: Multipart,
) -> ApiResult<CatalogView> {
    create_entry(&state, CatalogKind::ProjectPlatform, &origin, multipart).await
}

/// GET /api/v1/project-platform/:id?language_id= - includes title and description in that language
pub async fn project_platform_get(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<ApiResponse<CatalogView>, ApiError> {
    let (platform, translation) = state
        .catalogs()
        .project_platform_detail(id, query.language_id())
        .await?;
    Ok(ApiResponse::success(CatalogView::project_platform(platform, translation, &origin)))
}
