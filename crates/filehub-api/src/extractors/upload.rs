//! Multipart upload form extractor.

use axum::extract::{FromRequest, Multipart, Request};
use bytes::Bytes;
use uuid::Uuid;

use filehub_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The parts of a multipart upload: one `file` field plus an optional folder id.
#[derive(Debug, Clone)]
pub struct UploadForm {
    /// Target folder, if the form named one.
    pub folder_id: Option<Uuid>,
    /// File name sent with the `file` part.
    pub file_name: String,
    /// Content type sent with the `file` part.
    pub content_type: Option<String>,
    /// The file bytes.
    pub data: Bytes,
}

impl FromRequest<AppState> for UploadForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Expected a multipart form: {e}")))?;

        let mut folder_id = None;
        let mut file = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "folderId" | "folder_id" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        folder_id = Some(
                            Uuid::parse_str(text)
                                .map_err(|_| AppError::validation("Invalid folderId"))?,
                        );
                    }
                }
                "file" => {
                    let file_name = field.file_name().map(String::from);
                    let content_type = field.content_type().map(String::from);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                    file = Some((file_name, content_type, data));
                }
                _ => {}
            }
        }

        let (file_name, content_type, data) =
            file.ok_or_else(|| AppError::validation("file is required"))?;
        let file_name = file_name.ok_or_else(|| AppError::validation("file name is required"))?;

        Ok(Self {
            folder_id,
            file_name,
            content_type,
            data,
        })
    }
}
