use axum::extract::State;

use crate::app::AppState;
use crate::database::models::User;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::users::Registration;

/// POST /api/v1/register - Create an account
pub async fn register(State(state): State<AppState>, ApiJson(registration): ApiJson<Registration>) -> ApiResult<User> {
    let user = state.users().register(registration).await?;
    Ok(ApiResponse::created(user))
}
