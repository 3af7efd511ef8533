use axum::extract::State;

use crate::app::AppState;
use crate::handlers::query::ListQuery;
use crate::handlers::{ApiPath, ApiQuery};
use crate::middleware::{ApiList, ApiListResult};
use crate::services::views::SkillView;
use crate::storage::RequestOrigin;

/// GET /api/v1/public/user/:username/skill
pub async fn skills(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<SkillView> {
    let page = state
        .composition()
        .skills(&username, query.language_id(), state.page_request(&query), &origin)
        .await?
        .non_empty("User skill not found")?;
    Ok(ApiList::from(page))
}
