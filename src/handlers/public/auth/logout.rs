use axum::{extract::State, response::IntoResponse};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::middleware::ApiResponse;

use super::session_cookie;

/// GET /api/v1/logout - Expire the session cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let cookie = session_cookie(String::new(), 0, state.config.security.secure_cookies);
    (jar.add(cookie), ApiResponse::message_only("Logout successfully"))
}
