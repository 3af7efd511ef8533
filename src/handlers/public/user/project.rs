use axum::extract::State;

use crate::app::AppState;
use crate::handlers::query::ListQuery;
use crate::handlers::{ApiPath, ApiQuery};
use crate::middleware::{ApiList, ApiListResult};
use crate::services::views::ProjectView;
use crate::storage::RequestOrigin;

/// GET /api/v1/public/user/:username/project - optionally filtered by `project_platform_id`
pub async fn projects(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<ProjectView> {
    let page = state
        .composition()
        .projects(
            &username,
            query.language_id(),
            query.project_platform_id(),
            state.page_request(&query),
            &origin,
        )
        .await?
        .non_empty("User project not found")?;
    Ok(ApiList::from(page))
}
