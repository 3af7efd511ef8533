use axum::extract::{Extension, State};

use crate::app::AppState;
use crate::database::models::User;
use crate::handlers::query::ListQuery;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{ApiList, ApiListResult, ApiResponse, ApiResult, AuthUser};
use crate::services::users::UserUpdate;

/// GET /api/v1/profile - The authenticated user
pub async fn profile(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<User> {
    let user = state.users().get(auth_user.user_id).await?;
    Ok(ApiResponse::success(user))
}

/// GET /api/v1/user?name= - Search users by name
pub async fn list(State(state): State<AppState>, ApiQuery(query): ApiQuery<ListQuery>) -> ApiListResult<User> {
    let page = state
        .users()
        .list(query.name(), state.page_request(&query))
        .await?
        .non_empty("User not found")?;
    Ok(ApiList::from(page))
}

/// GET /api/v1/user/:id
pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult<User> {
    Ok(ApiResponse::success(state.users().get(id).await?))
}

/// PUT /api/v1/user/:id - Only the user themself may update their account
pub async fn put(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<User> {
    let user = state.users().update(auth_user.user_id, id, update).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/v1/user/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    state.users().delete(auth_user.user_id, id).await?;
    Ok(ApiResponse::message_only("User deleted"))
}
