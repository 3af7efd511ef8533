use axum::extract::State;

use crate::app::AppState;
use crate::handlers::query::ListQuery;
use crate::handlers::{ApiPath, ApiQuery};
use crate::middleware::{ApiList, ApiListResult};
use crate::services::views::EducationView;
use crate::storage::RequestOrigin;

/// GET /api/v1/public/user/:username/education
pub async fn educations(
    State(state): State<AppState>,
    origin: RequestOrigin,
    ApiPath(username): ApiPath<String>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiListResult<EducationView> {
    let page = state
        .composition()
        .educations(&username, query.language_id(), state.page_request(&query), &origin)
        .await?
        .non_empty("User education not found")?;
    Ok(ApiList::from(page))
}
