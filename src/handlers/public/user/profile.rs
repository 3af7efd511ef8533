use axum::extract::State;

use crate::app::AppState;
use crate::handlers::query::ListQuery;
use crate::handlers::{ApiPath, ApiQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::views::PublicProfileView;
use crate::storage::RequestOrigin;

/// GET /api/v1/public/user/:username - Public profile
pub async fn profile(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<PublicProfileView> {
    let profile = state
        .composition()
        .profile(&username, query.language_id(), &origin)
        .await?;
    Ok(ApiResponse::success(profile))
}
