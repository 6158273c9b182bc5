//! Materialized path arithmetic.
//!
//! Every folder stores its full ancestry as a slash-delimited string ending
//! in `/`. The owner's implicit root is `/`, so a top-level folder `A` has
//! path `/A/` and its child `B` has path `/A/B/`. Subtree membership is a
//! plain prefix test.

/// Path of the implicit root every owner's hierarchy hangs from.
pub const ROOT_PATH: &str = "/";

/// Path of a folder named `name` under a parent with path `parent_path`.
pub fn child_path(parent_path: &str, name: &str) -> String {
    format!("{parent_path}{name}/")
}

/// Path of the parent of the folder at `path`.
pub fn parent_path(path: &str) -> &str {
    match path.trim_end_matches('/').rfind('/') {
        Some(idx) => &path[..=idx],
        None => ROOT_PATH,
    }
}

/// Whether `path` is `ancestor` itself or a descendant of it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    path.starts_with(ancestor)
}

/// Number of named segments in `path`.
pub fn depth(path: &str) -> usize {
    path.split('/').filter(|segment| !segment.is_empty()).count()
}
