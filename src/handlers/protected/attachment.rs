use axum::extract::{Extension, Multipart, State};

use crate::app::AppState;
use crate::database::models::Attachment;
use crate::handlers::upload::{UploadForm, IMAGE_FIELD};
use crate::handlers::ApiPath;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::attachments::NewAttachment;

fn new_attachment(form: &mut UploadForm) -> NewAttachment {
    NewAttachment {
        title: form.text("title"),
        category: form.text("category"),
        url: form.text("url"),
        is_external_url: form.flag("is_external_url"),
        is_external_image_url: form.flag("is_external_image_url"),
        image_url: form.text("image_url"),
        image: form.take_file(IMAGE_FIELD),
    }
}

/// POST /api/v1/user-attachment - multipart `title`, `category`, `url`, flags, `image_file`
pub async fn user_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Attachment> {
    let mut form = UploadForm::parse(multipart, state.config.api.max_upload_bytes).await?;
    let attachment = state
        .attachments()
        .create_user_attachment(auth_user.user_id, new_attachment(&mut form))
        .await?;
    Ok(ApiResponse::created(attachment))
}

/// DELETE /api/v1/user-attachment/:id
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    state.attachments().delete_user_attachment(auth_user.user_id, id).await?;
    Ok(ApiResponse::message_only("User attachment deleted"))
}

/// POST /api/v1/user-project-attachment - same form plus `user_project_id`
pub async fn project_post(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    multipart: Multipart,
) -> ApiResult<Attachment> {
    let mut form = UploadForm::parse(multipart, state.config.api.max_upload_bytes).await?;
    let user_project_id = form.int("user_project_id")?;
    let attachment = state
        .attachments()
        .create_project_attachment(auth_user.user_id, user_project_id, new_attachment(&mut form))
        .await?;
    Ok(ApiResponse::created(attachment))
}

/// DELETE /api/v1/user-project-attachment/:id
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<()> {
    state.attachments().delete_project_attachment(auth_user.user_id, id).await?;
    Ok(ApiResponse::message_only("User project attachment deleted"))
}
