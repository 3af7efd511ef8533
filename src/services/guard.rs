//! Ownership checks for authenticated mutations.

use tracing::warn;

use crate::database::models::{Attachment, UserPosition, UserProject};

use super::{ServiceError, ServiceResult};

/// A record that resolves directly to the user owning it.
pub trait Owned {
    fn owner_id(&self) -> Option<i64>;
}

impl Owned for UserPosition {
    fn owner_id(&self) -> Option<i64> {
        Some(self.user_id)
    }
}

impl Owned for UserProject {
    fn owner_id(&self) -> Option<i64> {
        Some(self.user_id)
    }
}

/// Only user attachments carry `user_id`; project attachments resolve through their project.
impl Owned for Attachment {
    fn owner_id(&self) -> Option<i64> {
        self.user_id
    }
}

/// Fails with `Forbidden` unless `caller` owns `record`.
pub fn ensure_owner<T: Owned>(record: &T, caller: i64, entity: &str) -> ServiceResult<()> {
    match record.owner_id() {
        Some(owner) if owner == caller => Ok(()),
        owner => {
            warn!(caller, ?owner, entity, "Rejected mutation of record owned by another user");
            Err(ServiceError::Forbidden(format!("Not allowed to modify this {}", entity)))
        }
    }
}

/// Fails with `Forbidden` unless `caller` is `target` itself.
pub fn ensure_self(target: i64, caller: i64) -> ServiceResult<()> {
    if target == caller {
        return Ok(());
    }
    warn!(caller, target, "Rejected mutation of another user account");
    Err(ServiceError::Forbidden("Not allowed to modify another user".to_string()))
}
