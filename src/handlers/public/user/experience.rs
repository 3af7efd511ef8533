use axum::extract::State;

use crate::app::AppState;
use crate::handlers::query::ListQuery;
use crate::handlers::{ApiPath, ApiQuery};
use crate::middleware::{ApiList, ApiListResult};
use crate::services::views::ExperienceView;
use crate::storage::RequestOrigin;

/// GET /api/v1/public/user/:username/experience
pub async fn experiences(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<ExperienceView> {
    let page = state
        .composition()
        .experiences(&username, query.language_id(), state.page_request(&query), &origin)
        .await?
        .non_empty("User experience not found")?;
    Ok(ApiList::from(page))
}
