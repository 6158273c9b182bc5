//! Turns a resolved download into an HTTP response.

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};

use filehub_core::error::AppError;
use filehub_service::file::{DownloadBody, FileDownload};

use crate::error::ApiResult;

/// Redirect to a signed URL, or stream the bytes with file headers.
pub fn download_response(download: FileDownload) -> ApiResult<Response> {
    let FileDownload { file, body } = download;

    match body {
        DownloadBody::Redirect(url) => Ok(Redirect::temporary(&url).into_response()),
        DownloadBody::Stream(stream) => {
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, file.mime_type.as_str())
                .header(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", header_safe_name(&file.name)),
                )
                .header(header::CONTENT_LENGTH, file.size_bytes)
                .body(Body::from_stream(stream))
                .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;
            Ok(response)
        }
    }
}

/// A file name that fits inside a quoted header parameter.
fn header_safe_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
