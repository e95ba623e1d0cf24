use tracing::info;

use shared_backend::multipart::{Form, Part};
use shared_backend::{endpoints, BackendClient};
use shared_models::error::AppError;
use shared_models::notice::Notice;
use shared_models::session::SessionContext;

use crate::models::PhotoUploaded;

pub const PHOTO_FIELD: &str = "photo";
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug)]
pub struct PhotoFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    fn validate(&self) -> Result<(), AppError> {
        if self.bytes.is_empty() {
            return Err(AppError::BadRequest("Choose a photo to upload".to_string()));
        }
        if !self.content_type.starts_with("image/") {
            return Err(AppError::BadRequest("Only image files can be uploaded".to_string()));
        }
        if self.bytes.len() > MAX_PHOTO_BYTES {
            return Err(AppError::BadRequest("Photo must be 5 MB or smaller".to_string()));
        }
        Ok(())
    }
}

pub struct PhotoService {
    backend: BackendClient,
}

impl PhotoService {
    pub fn with_client(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn upload(&self, session: &SessionContext, photo: PhotoFile) -> Result<PhotoUploaded, AppError> {
        photo.validate()?;

        let size = photo.bytes.len();
        let part = Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(&photo.content_type)
            .map_err(|_| AppError::BadRequest("Only image files can be uploaded".to_string()))?;
        let form = Form::new()
            .text("doctorId", session.user_id.clone())
            .part(PHOTO_FIELD, part);

        let envelope = self
            .backend
            .post_multipart(endpoints::UPLOAD_DOCTOR_PHOTO, form, Some(&session.auth_token))
            .await?;

        let photo_url = envelope.first_string(&["photo", "photoUrl", "photo_url", "url"]);
        info!("Doctor {} uploaded a {} byte photo", session.user_id, size);

        Ok(PhotoUploaded {
            photo_url,
            notice: Notice::success("Photo updated", envelope.message_or("Your profile photo has been updated.")),
        })
    }
}
