use axum::extract::State;

use crate::app::AppState;
use crate::handlers::query::ListQuery;
use crate::handlers::{ApiPath, ApiQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::views::ProjectDetailView;
use crate::storage::RequestOrigin;

pub async fn project_detail(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath((username, slug)): ApiPath<(String, String)>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<ProjectDetailView> {
    let project = state
        .composition()
        .project_detail(&username, &slug, query.language_id(), &origin)
        .await?;
    Ok(ApiResponse::success(project))
}
