//! `NamespaceResolver` — resolves the isolation scope for vector entries
//! via a priority chain, normalizing long or path-shaped values to a
//! stable hash so on-disk directory names stay short and safe.

use crate::config::NamespaceConfig;
use sha2::{Digest, Sha256};
use std::sync::{Mutex, OnceLock};

/// Global mutable state #2 (the other is the proxy stream-id counter in
/// `noetic-search`): the stdio transport's workspace root, set once at
/// session init and read by every subsequent namespace resolution.
static WORKSPACE_ROOT: OnceLock<Mutex<Option<String>>> = OnceLock::new();

fn workspace_root_cell() -> &'static Mutex<Option<String>> {
    WORKSPACE_ROOT.get_or_init(|| Mutex::new(None))
}

/// Record the workspace root provided by a stdio client at session init.
pub fn set_workspace_root(root: impl Into<String>) {
    let mut guard = workspace_root_cell().lock().expect("workspace root lock poisoned");
    *guard = Some(root.into());
}

/// Clear the recorded workspace root (used by tests between cases).
pub fn clear_workspace_root() {
    let mut guard = workspace_root_cell().lock().expect("workspace root lock poisoned");
    *guard = None;
}

fn workspace_root() -> Option<String> {
    workspace_root_cell().lock().expect("workspace root lock poisoned").clone()
}

pub struct NamespaceResolver {
    config: NamespaceConfig,
}

impl NamespaceResolver {
    #[must_use]
    pub fn new(config: NamespaceConfig) -> Self {
        Self { config }
    }

    /// Resolve the namespace for one call: explicit parameter, then the
    /// `X-Noetic-Project` header (HTTP), then the stdio workspace root,
    /// then the configured default. Non-empty wins first.
    #[must_use]
    pub fn resolve(&self, explicit: Option<&str>, header: Option<&str>) -> String {
        let candidate = explicit
            .filter(|s| !s.is_empty())
            .or_else(|| header.filter(|s| !s.is_empty()))
            .map(str::to_string)
            .or_else(workspace_root)
            .unwrap_or_else(|| self.config.default_namespace.clone());

        self.normalize(&candidate)
    }

    /// Replace values containing `/` or longer than `max_len` with a
    /// stable `proj-<8 hex>` hash; otherwise pass through verbatim.
    #[must_use]
    pub fn normalize(&self, value: &str) -> String {
        if value.contains('/') || value.len() > self.config.max_len {
            Self::hash_project_path(value)
        } else {
            value.to_string()
        }
    }

    /// Deterministic 13-character `proj-<8 hex>` identifier for a path.
    #[must_use]
    pub fn hash_project_path(path: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        let digest = hasher.finalize();
        format!("proj-{}", hex::encode(&digest[..4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> NamespaceResolver {
        NamespaceResolver::new(NamespaceConfig::default())
    }

    #[test]
    fn hash_is_deterministic_and_shaped() {
        let a = NamespaceResolver::hash_project_path("a/b/c");
        let b = NamespaceResolver::hash_project_path("a/b/c");
        assert_eq!(a, b);
        assert_eq!(a.len(), 13);
        assert!(a.starts_with("proj-"));
    }

    #[test]
    fn normalize_matches_hash_for_path_like_values() {
        let r = resolver();
        assert_eq!(r.normalize("a/b/c"), NamespaceResolver::hash_project_path("a/b/c"));
    }

    #[test]
    fn normalize_passes_through_short_plain_values() {
        let r = resolver();
        assert_eq!(r.normalize("my-project"), "my-project");
    }

    #[test]
    fn normalize_hashes_overlong_values() {
        let r = resolver();
        let long = "x".repeat(100);
        assert!(r.normalize(&long).starts_with("proj-"));
    }

    #[test]
    fn explicit_parameter_wins_over_header() {
        let r = resolver();
        assert_eq!(r.resolve(Some("explicit"), Some("header")), "explicit");
    }

    #[test]
    #[serial_test::serial]
    fn falls_back_to_default_when_nothing_set() {
        clear_workspace_root();
        let r = resolver();
        assert_eq!(r.resolve(None, None), "default");
    }

    #[test]
    #[serial_test::serial]
    fn workspace_root_used_when_no_explicit_or_header() {
        set_workspace_root("stdio-root");
        let r = resolver();
        assert_eq!(r.resolve(None, None), "stdio-root");
        clear_workspace_root();
    }
}
