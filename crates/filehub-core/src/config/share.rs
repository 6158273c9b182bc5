//! Share link configuration.

use serde::{Deserialize, Serialize};

/// Share token and public URL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Base URL prepended to public share links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Random bytes per token before encoding.
    #[serde(default = "default_token_bytes")]
    pub token_bytes: usize,
    /// Attempts to find an unused token before giving up.
    #[serde(default = "default_max_token_attempts")]
    pub max_token_attempts: u32,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
            token_bytes: default_token_bytes(),
            max_token_attempts: default_max_token_attempts(),
        }
    }
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_token_bytes() -> usize {
    32
}

fn default_max_token_attempts() -> u32 {
    5
}
