//! Naming and typing of newly created resources.

use pod_types::vocab::ldp;
use uuid::Uuid;

/// Decides where new resources go, whether they are containers, and what
/// they are called.
#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionController;

impl InteractionController {
    pub fn new() -> Self {
        Self
    }

    /// The container a path lives in: the path itself if it already names a
    /// container, otherwise everything up to the last `/`.
    pub fn container_of(&self, path: &str) -> String {
        if path.ends_with('/') {
            return path.to_string();
        }
        match path.rfind('/') {
            Some(idx) => path[..=idx].to_string(),
            None => "/".to_string(),
        }
    }

    /// A new resource is a container if its slug ends in `/` or a Link type
    /// marks it as one.
    pub fn is_container(&self, slug: Option<&str>, link_types: &[String]) -> bool {
        slug.is_some_and(|s| s.ends_with('/'))
            || link_types
                .iter()
                .any(|t| t == ldp::CONTAINER || t == ldp::BASIC_CONTAINER)
    }

    /// Member name for a new resource: the slug when it is usable, a random
    /// UUID otherwise. Container names end in `/`.
    pub fn generate_identifier(&self, is_container: bool, slug: Option<&str>) -> String {
        let name = slug
            .map(|s| s.trim_matches('/').replace('/', "-"))
            .filter(|s| !is_reserved_name(s))
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        if is_container {
            format!("{name}/")
        } else {
            name
        }
    }
}

/// Names clients may not use: empty, hidden, or colliding with metadata
/// sidecars.
pub fn is_reserved_name(name: &str) -> bool {
    name.is_empty() || name.starts_with('.') || name.ends_with(".metadata")
}
