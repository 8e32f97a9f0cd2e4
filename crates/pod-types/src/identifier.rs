//! Resource identifiers.

use std::fmt;

/// An absolute URI naming a resource. Containers end in `/`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceIdentifier {
    path: String,
}

impl ResourceIdentifier {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_container(&self) -> bool {
        self.path.ends_with('/')
    }

    /// The container holding this identifier: everything up to and including
    /// the last `/` before any trailing one. `None` when there is no such
    /// slash left after the scheme.
    pub fn parent(&self) -> Option<ResourceIdentifier> {
        let trimmed = trim_trailing_slashes(&self.path);
        let idx = trimmed.rfind('/')?;
        let parent = &trimmed[..=idx];
        if parent.ends_with("//") {
            return None;
        }
        Some(Self::new(parent))
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for ResourceIdentifier {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ResourceIdentifier {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for ResourceIdentifier {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

/// `path` with exactly one trailing `/`.
pub fn ensure_trailing_slash(path: &str) -> String {
    format!("{}/", trim_trailing_slashes(path))
}

/// `path` without any trailing `/`.
pub fn trim_trailing_slashes(path: &str) -> &str {
    path.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_detection() {
        assert!(ResourceIdentifier::new("http://x/a/").is_container());
        assert!(!ResourceIdentifier::new("http://x/a").is_container());
    }

    #[test]
    fn parent_of_resource_and_container() {
        let parent = |p: &str| ResourceIdentifier::new(p).parent().map(|id| id.to_string());
        assert_eq!(parent("http://x/a/b").as_deref(), Some("http://x/a/"));
        assert_eq!(parent("http://x/a/b/").as_deref(), Some("http://x/a/"));
        assert_eq!(parent("http://x/a").as_deref(), Some("http://x/"));
        assert_eq!(parent("http://x/"), None);
    }

    #[test]
    fn slash_helpers() {
        assert_eq!(ensure_trailing_slash("http://x/a"), "http://x/a/");
        assert_eq!(ensure_trailing_slash("http://x/a//"), "http://x/a/");
        assert_eq!(trim_trailing_slashes("/root///"), "/root");
    }
}
