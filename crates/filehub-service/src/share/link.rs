//! Share link token generation and public URLs.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Source of candidate share tokens.
pub trait TokenGenerator: Send + Sync + std::fmt::Debug + 'static {
    /// Produce one fresh, URL-safe token.
    fn generate(&self) -> String;
}

/// Tokens of `bytes` random bytes from the thread-local CSPRNG, base64url encoded.
#[derive(Debug, Clone, Copy)]
pub struct RandomTokenGenerator {
    bytes: usize,
}

impl RandomTokenGenerator {
    /// Creates a generator producing tokens from `bytes` random bytes.
    pub fn new(bytes: usize) -> Self {
        Self { bytes }
    }
}

impl Default for RandomTokenGenerator {
    fn default() -> Self {
        Self::new(32)
    }
}

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut buf = vec![0u8; self.bytes];
        rand::rng().fill_bytes(&mut buf);
        URL_SAFE_NO_PAD.encode(buf)
    }
}

/// Generates share tokens and the public URLs that carry them.
#[derive(Debug, Clone)]
pub struct LinkService {
    generator: Arc<dyn TokenGenerator>,
    public_base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(generator: Arc<dyn TokenGenerator>, public_base_url: &str) -> Self {
        Self {
            generator,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// A fresh candidate token. Uniqueness is checked by the caller.
    pub fn generate_token(&self) -> String {
        self.generator.generate()
    }

    /// Public URL for a token.
    pub fn public_url(&self, token: &str) -> String {
        format!("{}/api/shares/public/{token}", self.public_base_url)
    }
}
