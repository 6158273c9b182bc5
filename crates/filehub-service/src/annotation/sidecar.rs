//! HTTP client for the ML sidecar.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};

use filehub_core::config::AnnotationConfig;
use filehub_core::error::{AppError, ErrorKind};
use filehub_core::result::AppResult;
use filehub_core::traits::{AnnotationRequest, Annotator};
use filehub_entity::file::model::extension_of;

const CATEGORIZE_PATH: &str = "/api/categorization/categorize";
const PII_PATH: &str = "/api/pii/assess-sensitivity";
const SUMMARIZE_PATH: &str = "/api/summarization/summarize";

const SUMMARY_MAX_LENGTH: u32 = 150;
const SUMMARY_MIN_LENGTH: u32 = 50;

#[derive(Debug, Serialize)]
struct CategorizeBody<'a> {
    mime_type: &'a str,
    extension: Option<String>,
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SummarizeBody<'a> {
    text: &'a str,
    max_length: u32,
    min_length: u32,
}

/// Annotates uploads through the ML sidecar's categorization, PII, and
/// summarization endpoints.
///
/// Every file is categorized. Text files small enough to send are also
/// assessed for sensitive data and summarized.
#[derive(Debug, Clone)]
pub struct MlSidecarAnnotator {
    client: Client,
    base_url: String,
    max_text_bytes: usize,
}

impl MlSidecarAnnotator {
    /// Creates a new sidecar client from annotation configuration.
    pub fn new(config: &AnnotationConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build ML sidecar client", e)
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_text_bytes: config.max_text_bytes,
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::BackendUnavailable,
                    format!("ML sidecar call to {path} failed"),
                    e,
                )
            })?;

        response.json::<Value>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("ML sidecar returned an unreadable body for {path}"),
                e,
            )
        })
    }

    /// The text to analyze, if the file is textual and small enough.
    fn text_payload<'a>(&self, request: &'a AnnotationRequest) -> Option<&'a str> {
        if !is_textual(&request.mime_type) || request.content.len() > self.max_text_bytes {
            return None;
        }
        std::str::from_utf8(&request.content)
            .ok()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Whether a MIME type carries human-readable text.
fn is_textual(mime_type: &str) -> bool {
    mime_type.starts_with("text/")
        || matches!(
            mime_type,
            "application/json" | "application/xml" | "application/x-yaml"
        )
}

#[async_trait]
impl Annotator for MlSidecarAnnotator {
    fn name(&self) -> &str {
        "ml"
    }

    async fn annotate(&self, request: &AnnotationRequest) -> AppResult<Value> {
        let category = self
            .post(
                CATEGORIZE_PATH,
                &CategorizeBody {
                    mime_type: &request.mime_type,
                    extension: extension_of(&request.file_name),
                },
            )
            .await?;

        let mut result = json!({ "category": category });

        if let Some(text) = self.text_payload(request) {
            result["sensitivity"] = self.post(PII_PATH, &TextBody { text }).await?;
            result["summary"] = self
                .post(
                    SUMMARIZE_PATH,
                    &SummarizeBody {
                        text,
                        max_length: SUMMARY_MAX_LENGTH,
                        min_length: SUMMARY_MIN_LENGTH,
                    },
                )
                .await?;
        }

        Ok(result)
    }
}
