use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::app::AppState;
use crate::auth::Claims;
use crate::error::ApiError;

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt(request.headers()).map_err(ApiError::unauthorized)?;

    let claims = state.jwt.verify(&token).map_err(|e| {
        tracing::debug!("Rejected token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Extract JWT token from the Authorization header, falling back to the session cookie
fn extract_jwt(headers: &HeaderMap) -> Result<String, String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Some(_) => Err("Empty JWT token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value_trimmed())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| "Missing authentication token".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token=xyz"));
        assert_eq!(extract_jwt(&headers).unwrap(), "abc");
    }

    #[test]
    fn cookie_is_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=xyz"));
        assert_eq!(extract_jwt(&headers).unwrap(), "xyz");
    }

    #[test]
    fn quoted_cookie_value_is_unwrapped() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=\"xyz\""));
        assert_eq!(extract_jwt(&headers).unwrap(), "xyz");
    }

    #[test]
    fn missing_or_malformed_credentials_are_rejected() {
        assert!(extract_jwt(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_jwt(&headers).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert!(extract_jwt(&headers).is_err());
    }
}
