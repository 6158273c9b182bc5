//! Integration tests for the FileHub storage engine.
//!
//! Every test gets its own SQLite file and local storage root in a temp dir.

mod annotation_test;
mod api_test;
mod file_test;
mod folder_test;
mod helpers;
mod maintenance_test;
mod quota_test;
