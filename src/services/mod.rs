//! Domain operations. Handlers stay thin and call into these services,
//! which own validation, ownership checks and composition.

pub mod attachments;
pub mod catalogs;
pub mod composition;
pub mod content;
pub mod guard;
pub mod pagination;
pub mod translations;
pub mod users;
pub mod views;

use thiserror::Error;

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::storage::BlobError;

pub use attachments::AttachmentService;
pub use catalogs::{CatalogKind, CatalogService};
pub use composition::CompositionService;
pub use content::ContentService;
pub use pagination::{Page, PageRequest};
pub use translations::TranslationService;
pub use users::UserService;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Storage(#[from] BlobError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Trims `value` and checks it is non-empty and at most `max_chars` long.
pub(crate) fn required_text(field: &str, value: &str, max_chars: usize) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::BadRequest(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max_chars {
        return Err(ServiceError::BadRequest(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims `value`, which may be empty, and checks it is at most `max_chars` long.
pub(crate) fn optional_text(field: &str, value: &str, max_chars: usize) -> ServiceResult<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_chars {
        return Err(ServiceError::BadRequest(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(trimmed.to_string())
}

/// Current time in milliseconds, used to keep upload filenames unique.
pub(crate) fn upload_timestamp() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
