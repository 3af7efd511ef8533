use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, JwtKeys};
use crate::database::models::{Attachment, User, UserProject};
use crate::database::{Repository, Store, Table};
use crate::filter::FilterData;
use crate::storage::BlobStore;

use super::guard::ensure_self;
use super::pagination::{Page, PageRequest};
use super::{required_text, ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub name: String,
    pub username: String,
}

/// Identity store: accounts, credentials and profile updates.
pub struct UserService {
    users: Repository<User>,
    projects: Repository<UserProject>,
    attachments: Repository<Attachment>,
    project_attachments: Repository<Attachment>,
    blobs: Arc<dyn BlobStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            users: Repository::new(Table::Users, store.clone()),
            projects: Repository::new(Table::UserProjects, store.clone()),
            attachments: Repository::new(Table::UserAttachments, store.clone()),
            project_attachments: Repository::new(Table::UserProjectAttachments, store),
            blobs,
        }
    }

    pub async fn register(&self, registration: Registration) -> ServiceResult<User> {
        let name = required_text("name", &registration.name, 100)?;
        let username = validate_username(&registration.username)?;
        if registration.password.len() < 6 {
            return Err(ServiceError::BadRequest(
                "password must be at least 6 characters".to_string(),
            ));
        }

        if self.users.exists(json!({ "username": username })).await? {
            return Err(ServiceError::Conflict("Username already used".to_string()));
        }

        let password = hash_password(&registration.password)?;
        let user = self
            .users
            .insert(json!({ "name": name, "username": username, "password": password }))
            .await?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Verifies credentials and issues a session token.
    pub async fn login(&self, keys: &JwtKeys, credentials: Credentials) -> ServiceResult<(User, String)> {
        let invalid = || ServiceError::Unauthorized("Invalid username or password".to_string());

        let user = self
            .users
            .select_one(FilterData::matching(json!({ "username": credentials.username.trim() })))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&credentials.password, &user.password)? {
            warn!(username = %user.username, "Failed login attempt");
            return Err(invalid());
        }

        let token = keys.issue(user.id, &user.username)?;
        info!(user_id = user.id, "User logged in");
        Ok((user, token))
    }

    pub async fn get(&self, id: i64) -> ServiceResult<User> {
        Ok(self.users.select_id(id).await?)
    }

    pub async fn by_username(&self, username: &str) -> ServiceResult<User> {
        self.users
            .select_one(FilterData::matching(json!({ "username": username })))
            .await?
            .ok_or_else(|| ServiceError::NotFound("Username not found".to_string()))
    }

    /// Lists users, optionally filtered by a case-insensitive name fragment.
    pub async fn list(&self, name: Option<&str>, request: PageRequest) -> ServiceResult<Page<User>> {
        let where_clause = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(fragment) => json!({ "name": { "$ilike": format!("%{}%", escape_like(fragment)) } }),
            None => json!({}),
        };

        let total_count = self.users.count(FilterData::matching(where_clause.clone())).await?;
        let items = self
            .users
            .select_any(request.apply(FilterData::matching(where_clause)))
            .await?;

        Ok(Page::new(items, request, total_count))
    }

    pub async fn update(&self, caller: i64, id: i64, update: UserUpdate) -> ServiceResult<User> {
        ensure_self(id, caller)?;
        let name = required_text("name", &update.name, 100)?;
        let username = validate_username(&update.username)?;

        self.users.select_id(id).await?;

        let taken = self
            .users
            .exists(json!({ "username": username, "id": { "$ne": id } }))
            .await?;
        if taken {
            return Err(ServiceError::Conflict("Username already used".to_string()));
        }

        let user = self
            .users
            .update(id, json!({ "name": name, "username": username }))
            .await?;
        info!(user_id = id, "Updated user");
        Ok(user)
    }

    /// Deletes the caller's own account. Owned rows cascade; uploaded files are removed afterwards.
    pub async fn delete(&self, caller: i64, id: i64) -> ServiceResult<()> {
        ensure_self(id, caller)?;
        self.users.select_id(id).await?;

        let projects = self.projects.select_any(FilterData::matching(json!({ "user_id": id }))).await?;
        let project_ids: Vec<i64> = projects.iter().map(|p| p.id).collect();
        let mut files: Vec<String> = projects.into_iter().map(|p| p.image_url).collect();
        files.extend(
            self.attachments
                .select_any(FilterData::matching(json!({ "user_id": id })))
                .await?
                .into_iter()
                .filter(|a| !a.is_external_image_url)
                .map(|a| a.image_url),
        );
        files.extend(
            self.project_attachments
                .select_in("user_project_id", &project_ids)
                .await?
                .into_iter()
                .filter(|a| !a.is_external_image_url)
                .map(|a| a.image_url),
        );

        self.users.delete_404(json!({ "id": id })).await?;
        info!(user_id = id, "Deleted user");

        for file in files.iter().filter(|f| !f.is_empty()) {
            if let Err(e) = self.blobs.remove(file).await {
                warn!(path = %file, error = %e, "Failed to remove uploaded file");
            }
        }
        Ok(())
    }
}

fn validate_username(value: &str) -> ServiceResult<String> {
    let username = required_text("username", value, 50)?;
    let valid = username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !valid {
        return Err(ServiceError::BadRequest(
            "username may only contain letters, digits, '_', '-' and '.'".to_string(),
        ));
    }
    Ok(username)
}

fn escape_like(fragment: &str) -> String {
    fragment.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::attachments::{AttachmentService, NewAttachment};
    use crate::storage::Upload;
    use crate::testing::{MemoryBlobStore, MemoryStore, TEST_JWT_SECRET};

    fn registration(username: &str) -> Registration {
        Registration {
            name: "Alice".to_string(),
            username: username.to_string(),
            password: "secret123".to_string(),
        }
    }

    #[tokio::test]
    async fn registered_passwords_are_hashed_and_verified() {
        let service = UserService::new(Arc::new(MemoryStore::new()), Arc::new(MemoryBlobStore::new()));
        let user = service.register(registration("alice")).await.unwrap();
        assert_ne!(user.password, "secret123");

        let keys = JwtKeys::new(TEST_JWT_SECRET, 1).unwrap();
        let (logged_in, token) = service
            .login(
                &keys,
                Credentials {
                    username: " alice ".to_string(),
                    password: "secret123".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(keys.verify(&token).unwrap().user_id, user.id);
    }

    #[tokio::test]
    async fn registration_input_is_validated() {
        let service = UserService::new(Arc::new(MemoryStore::new()), Arc::new(MemoryBlobStore::new()));

        let short = Registration {
            password: "123".to_string(),
            ..registration("alice")
        };
        assert!(matches!(service.register(short).await, Err(ServiceError::BadRequest(_))));
        assert!(matches!(
            service.register(registration("al ice")).await,
            Err(ServiceError::BadRequest(_))
        ));

        service.register(registration("alice")).await.unwrap();
        assert!(matches!(
            service.register(registration("alice")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn deleting_an_account_removes_uploaded_files() {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = UserService::new(store.clone(), blobs.clone());
        let user = service.register(registration("alice")).await.unwrap();

        let attachment = AttachmentService::new(store.clone(), blobs.clone())
            .create_user_attachment(
                user.id,
                NewAttachment {
                    title: "CV".to_string(),
                    image: Some(Upload {
                        filename: "cv.png".to_string(),
                        bytes: vec![1, 2, 3],
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(blobs.contains(&attachment.image_url));

        assert!(matches!(service.delete(user.id + 1, user.id).await, Err(ServiceError::Forbidden(_))));

        service.delete(user.id, user.id).await.unwrap();
        assert!(!blobs.contains(&attachment.image_url));
        assert_eq!(store.len(Table::UserAttachments), 0);
        assert!(matches!(
            service.get(user.id).await,
            Err(ServiceError::Store(crate::database::StoreError::NotFound(Table::Users)))
        ));
    }
}
