//! Password hashing for protected share links.

pub mod hasher;

pub use hasher::PasswordHasher;
