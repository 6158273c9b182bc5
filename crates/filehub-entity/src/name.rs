//! Display-name rules shared by files and folders.

use filehub_core::{AppError, AppResult};

/// Longest accepted file or folder name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Validate a user-supplied file or folder name and return it trimmed.
///
/// Slashes are refused because folder paths are slash-delimited.
pub fn validate_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation(format!("'{name}' is not a valid name")));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(AppError::validation("Name must not contain slashes"));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::validation("Name must not contain control characters"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "Name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}
