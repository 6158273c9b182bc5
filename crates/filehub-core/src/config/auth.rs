//! Access token verification configuration.

use serde::{Deserialize, Serialize};

/// Settings for verifying access tokens issued by the external auth service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the token issuer.
    pub jwt_secret: String,
    /// Expected `iss` claim, if the issuer sets one.
    #[serde(default)]
    pub jwt_issuer: Option<String>,
}
