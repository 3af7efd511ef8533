use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::middleware::ApiResponse;
use crate::services::users::Credentials;

use super::session_cookie;

/// POST /api/v1/login - Verify credentials and start a session
///
/// Returns `{ "token": "..." }` and sets the same token as an HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, token) = state.users().login(&state.jwt, credentials).await?;
    let cookie = session_cookie(
        token.clone(),
        state.jwt.expiry_hours() * 3600,
        state.config.security.secure_cookies,
    );

    Ok((jar.add(cookie), ApiResponse::success(json!({ "token": token }))))
}
