//! Namespacing of remote parameter names.
//!
//! A user-facing key like `mykey` is stored remotely under
//! `/<prefix>/mykey`, so several pemstore instances can share one parameter
//! store without collisions. The mapping is pure and deterministic.

pub const DELIMITER: char = '/';
pub const DEFAULT_PREFIX: &str = "pemstore";

/// Fully-qualified remote parameter name for `key` under `prefix`.
pub fn qualified(prefix: &str, key: &str) -> String {
    format!("{DELIMITER}{prefix}{DELIMITER}{key}")
}

/// The leading namespace segment shared by every key under `prefix`,
/// used as a `BeginsWith` filter when listing.
pub fn namespace(prefix: &str) -> String {
    format!("{DELIMITER}{prefix}{DELIMITER}")
}

/// Strips the namespace from a fully-qualified name, returning the bare key.
/// Returns `None` for names outside the namespace.
pub fn strip(prefix: &str, qualified_name: &str) -> Option<String> {
    qualified_name
        .strip_prefix(&namespace(prefix))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_shape() {
        let name = qualified("pemstore", "mykey");
        assert!(name.starts_with(DELIMITER));
        assert!(name.contains("pemstore"));
        assert_eq!(name, "/pemstore/mykey");
    }

    #[test]
    fn test_qualified_is_deterministic() {
        assert_eq!(qualified("p", "k"), qualified("p", "k"));
    }

    #[test]
    fn test_distinct_keys_never_collide() {
        assert_ne!(qualified("pemstore", "a"), qualified("pemstore", "b"));
    }

    #[test]
    fn test_distinct_prefixes_never_collide() {
        assert_ne!(qualified("team-a", "k"), qualified("team-b", "k"));
    }

    #[test]
    fn test_strip_inverts_qualified() {
        let name = qualified("pemstore", "mykey");
        assert_eq!(strip("pemstore", &name), Some("mykey".to_string()));
    }

    #[test]
    fn test_strip_rejects_foreign_namespace() {
        assert_eq!(strip("pemstore", "/other/mykey"), None);
    }
}
