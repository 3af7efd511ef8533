use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::database::models::{Attachment, User, UserProject};
use crate::database::{Repository, Store, Table};
use crate::storage::{dirs, upload_filename, BlobStore, Upload};

use super::guard::ensure_owner;
use super::{optional_text, required_text, upload_timestamp, ServiceError, ServiceResult};

#[derive(Debug, Clone, Default)]
pub struct NewAttachment {
    pub title: String,
    pub category: String,
    pub url: String,
    pub is_external_url: bool,
    pub is_external_image_url: bool,
    /// Used instead of an upload when `is_external_image_url` is set.
    pub image_url: String,
    pub image: Option<Upload>,
}

/// Images and links attached to a user profile or to one of the user's projects.
pub struct AttachmentService {
    users: Repository<User>,
    projects: Repository<UserProject>,
    user_attachments: Repository<Attachment>,
    project_attachments: Repository<Attachment>,
    blobs: Arc<dyn BlobStore>,
}

impl AttachmentService {
    pub fn new(store: Arc<dyn Store>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            users: Repository::new(Table::Users, store.clone()),
            projects: Repository::new(Table::UserProjects, store.clone()),
            user_attachments: Repository::new(Table::UserAttachments, store.clone()),
            project_attachments: Repository::new(Table::UserProjectAttachments, store),
            blobs,
        }
    }

    pub async fn create_user_attachment(&self, owner: i64, new: NewAttachment) -> ServiceResult<Attachment> {
        let title = required_text("title", &new.title, 128)?;
        let category = optional_text("category", &new.category, 64)?;
        self.users.select_id(owner).await?;

        let image_url = self.image_for(owner, &title, dirs::USER_ATTACHMENT, &new).await?;
        let attachment = self
            .user_attachments
            .insert(json!({
                "user_id": owner,
                "title": title,
                "category": category,
                "image_url": image_url,
                "url": new.url.trim(),
                "is_external_url": new.is_external_url,
                "is_external_image_url": new.is_external_image_url,
            }))
            .await?;

        info!(id = attachment.id, user_id = owner, "Created user attachment");
        Ok(attachment)
    }

    pub async fn delete_user_attachment(&self, caller: i64, id: i64) -> ServiceResult<()> {
        let attachment = self.user_attachments.select_id(id).await?;
        ensure_owner(&attachment, caller, "user attachment")?;

        self.user_attachments.delete_404(json!({ "id": id })).await?;
        info!(id, user_id = caller, "Deleted user attachment");
        self.remove_image(&attachment).await;
        Ok(())
    }

    pub async fn create_project_attachment(
        &self,
        caller: i64,
        user_project_id: i64,
        new: NewAttachment,
    ) -> ServiceResult<Attachment> {
        let title = required_text("title", &new.title, 128)?;
        let category = optional_text("category", &new.category, 64)?;
        let project = self.projects.select_id(user_project_id).await?;
        ensure_owner(&project, caller, "user project")?;

        let image_url = self
            .image_for(caller, &title, dirs::USER_PROJECT_ATTACHMENT, &new)
            .await?;
        let attachment = self
            .project_attachments
            .insert(json!({
                "user_project_id": project.id,
                "title": title,
                "category": category,
                "image_url": image_url,
                "url": new.url.trim(),
                "is_external_url": new.is_external_url,
                "is_external_image_url": new.is_external_image_url,
            }))
            .await?;

        info!(id = attachment.id, user_project_id = project.id, "Created project attachment");
        Ok(attachment)
    }

    /// Project attachments are guarded through the project they belong to.
    pub async fn delete_project_attachment(&self, caller: i64, id: i64) -> ServiceResult<()> {
        let attachment = self.project_attachments.select_id(id).await?;
        let project_id = attachment
            .user_project_id
            .ok_or(ServiceError::NotFound("User project not found".to_string()))?;
        let project = self.projects.select_id(project_id).await?;
        ensure_owner(&project, caller, "user project")?;

        self.project_attachments.delete_404(json!({ "id": id })).await?;
        info!(id, user_project_id = project_id, "Deleted project attachment");
        self.remove_image(&attachment).await;
        Ok(())
    }

    async fn image_for(&self, owner: i64, title: &str, directory: &str, new: &NewAttachment) -> ServiceResult<String> {
        match &new.image {
            Some(upload) => {
                let filename = upload_filename(upload_timestamp(), owner, title, &upload.filename);
                Ok(self.blobs.store(directory, &filename, &upload.bytes).await?)
            }
            None if new.is_external_image_url && !new.image_url.trim().is_empty() => {
                Ok(new.image_url.trim().to_string())
            }
            None => Err(ServiceError::BadRequest("Failed to get file".to_string())),
        }
    }

    async fn remove_image(&self, attachment: &Attachment) {
        if attachment.is_external_image_url || attachment.image_url.is_empty() {
            return;
        }
        if let Err(e) = self.blobs.remove(&attachment.image_url).await {
            warn!(path = %attachment.image_url, error = %e, "Failed to remove uploaded file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Row;
    use crate::testing::{MemoryBlobStore, MemoryStore};
    use serde_json::Value;

    async fn insert(store: &MemoryStore, table: Table, values: Value) -> i64 {
        let Value::Object(values) = values else { unreachable!() };
        let row: Row = store.insert(table, values).await.unwrap();
        row["id"].as_i64().unwrap()
    }

    async fn fixture() -> (AttachmentService, Arc<MemoryBlobStore>, i64, i64, i64) {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let alice = insert(&store, Table::Users, json!({ "name": "Alice", "username": "alice", "password": "x" })).await;
        let bob = insert(&store, Table::Users, json!({ "name": "Bob", "username": "bob", "password": "x" })).await;
        let platform = insert(
            &store,
            Table::ProjectPlatforms,
            json!({ "code": "GH", "name": "GitHub", "image_url": "", "url": "",
                    "is_external_url": false, "is_external_image_url": false, "address": "" }),
        )
        .await;
        let project = insert(
            &store,
            Table::UserProjects,
            json!({ "user_id": alice, "project_platform_id": platform, "slug": "site",
                    "image_url": "", "is_active": true }),
        )
        .await;
        (AttachmentService::new(store, blobs.clone()), blobs, alice, bob, project)
    }

    fn upload(title: &str) -> NewAttachment {
        NewAttachment {
            title: title.to_string(),
            image: Some(Upload {
                filename: "cv.pdf".to_string(),
                bytes: b"%PDF".to_vec(),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn overlong_category_is_rejected_before_storing() {
        let (service, blobs, alice, _, project) = fixture().await;
        let new = NewAttachment { category: "c".repeat(65), ..upload("My CV") };

        let err = service.create_user_attachment(alice, new.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(m) if m == "category must be at most 64 characters"));
        let err = service.create_project_attachment(alice, project, new).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert_eq!(blobs.stored_count(), 0);

        let new = NewAttachment { category: " Resume ".to_string(), ..upload("My CV") };
        let attachment = service.create_user_attachment(alice, new).await.unwrap();
        assert_eq!(attachment.category, "Resume");
    }

    #[tokio::test]
    async fn user_attachment_files_follow_the_row() {
        let (service, blobs, alice, bob, _) = fixture().await;
        let attachment = service.create_user_attachment(alice, upload("My CV")).await.unwrap();

        assert!(attachment.image_url.starts_with("assets/images/user/attachment/"));
        assert!(attachment.image_url.ends_with(&format!("_{}_My_CV.pdf", alice)));
        assert!(blobs.contains(&attachment.image_url));

        let err = service.delete_user_attachment(bob, attachment.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(blobs.contains(&attachment.image_url));

        service.delete_user_attachment(alice, attachment.id).await.unwrap();
        assert!(!blobs.contains(&attachment.image_url));
    }

    #[tokio::test]
    async fn attachments_need_an_image() {
        let (service, _, alice, _, _) = fixture().await;
        let new = NewAttachment {
            title: "Link".to_string(),
            ..Default::default()
        };
        let err = service.create_user_attachment(alice, new).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(ref m) if m == "Failed to get file"));
    }

    #[tokio::test]
    async fn project_attachments_are_guarded_by_the_project_owner() {
        let (service, blobs, alice, bob, project) = fixture().await;

        let err = service
            .create_project_attachment(bob, project, upload("Shot"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert_eq!(blobs.stored_count(), 0);

        let external = NewAttachment {
            title: "Shot".to_string(),
            is_external_image_url: true,
            image_url: "https://cdn.example.com/shot.png".to_string(),
            ..Default::default()
        };
        let attachment = service.create_project_attachment(alice, project, external).await.unwrap();
        assert_eq!(attachment.user_project_id, Some(project));
        assert_eq!(attachment.user_id, None);

        let err = service.delete_project_attachment(bob, attachment.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        service.delete_project_attachment(alice, attachment.id).await.unwrap();
    }
}
