pub mod auth;
pub mod origin;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser, TOKEN_COOKIE};
pub use response::{ApiList, ApiListResult, ApiResponse, ApiResult};
