// Account and session endpoints that do not require a token.

use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use crate::middleware::TOKEN_COOKIE;

pub mod login; // POST /api/v1/login
pub mod logout; // GET /api/v1/logout
pub mod register; // POST /api/v1/register

pub use login::login;
pub use logout::logout;
pub use register::register;

/// Session cookie carrying `token`, valid for `max_age_secs`.
fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age_secs))
        .build()
}
