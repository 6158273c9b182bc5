//! ML sidecar annotation configuration.

use serde::{Deserialize, Serialize};

/// Best-effort content annotation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationConfig {
    /// Whether uploads are sent to the sidecar at all.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the ML sidecar.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound on a single annotation round trip.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Text content larger than this is not sent for PII or summary analysis.
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_text_bytes: default_max_text_bytes(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_text_bytes() -> usize {
    1_048_576
}
