//! # filehub-auth
//!
//! Verification of bearer tokens issued by the external identity service,
//! and Argon2id hashing for share passwords.
//!
//! ## Modules
//!
//! - `jwt`: access token claims, verification, and signing
//! - `password`: Argon2id password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
