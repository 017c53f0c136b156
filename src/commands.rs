//! Command handlers behind the CLI.
//!
//! Each handler performs its precondition checks in order, then the remote
//! and local calls, and returns a typed outcome. Policy decisions (force
//! overwrite, force delete) live here, never in the [`SecretStore`]
//! implementation. `main` maps the returned errors to exit codes.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::local::{self, CleanOutcome};
use crate::name;
use crate::store::SecretStore;

/// What `delete` did (or declined to do).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Key is present but `--force` was not given; nothing was deleted.
    WouldDelete,
    /// Remote parameter was deleted.
    Deleted,
}

fn ensure_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(name::DELIMITER) {
        return Err(Error::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Fetches the secret for `key` into `<root>/<key>`.
///
/// The destination must not already exist and the remote key must; either
/// violation is a known error and nothing is written.
pub async fn get(remote: &dyn SecretStore, root: &Path, key: &str) -> Result<PathBuf> {
    ensure_key(key)?;
    let path = root.join(key);
    if path.exists() {
        return Err(Error::LocalConflict(path));
    }
    if !remote.exists(key).await? {
        return Err(Error::KeyNotFound(key.to_string()));
    }

    let value = remote.get(key, true).await?;
    debug!(key, bytes = value.len(), "fetched secret");
    local::write_new(&path, &value)?;
    Ok(path)
}

/// Uploads a local PEM file as the secret for `key`.
///
/// Reads from `source` when given, otherwise from the cached copy at
/// `<root>/<key>`. Refuses to overwrite an existing remote key unless
/// `force` is set; the remote existence check happens before the local
/// file is touched.
pub async fn store(
    remote: &dyn SecretStore,
    root: &Path,
    key: &str,
    source: Option<PathBuf>,
    force: bool,
) -> Result<PathBuf> {
    ensure_key(key)?;
    if remote.exists(key).await? && !force {
        return Err(Error::KeyExists(key.to_string()));
    }

    let path = source.unwrap_or_else(|| root.join(key));
    let data = local::read_existing(&path)?;
    debug!(key, bytes = data.len(), source = %path.display(), "uploading secret");
    remote.store(key, &data, force).await?;
    Ok(path)
}

/// All bare key names under the namespace.
pub async fn list(remote: &dyn SecretStore) -> Result<Vec<String>> {
    remote.list().await
}

/// Drops the locally cached copy of `key`, gated on `force`.
pub fn clean(root: &Path, key: &str, force: bool) -> Result<(PathBuf, CleanOutcome)> {
    ensure_key(key)?;
    let path = root.join(key);
    let outcome = local::remove_if_forced(&path, force)?;
    Ok((path, outcome))
}

/// Deletes the remote secret for `key`, gated on `force`.
///
/// A missing key is a known error; a present key without `force` is
/// reported as [`DeleteOutcome::WouldDelete`] and left in place.
pub async fn delete(remote: &dyn SecretStore, key: &str, force: bool) -> Result<DeleteOutcome> {
    ensure_key(key)?;
    if !remote.exists(key).await? {
        return Err(Error::KeyNotFound(key.to_string()));
    }
    if !force {
        return Ok(DeleteOutcome::WouldDelete);
    }
    remote.remove(key).await?;
    Ok(DeleteOutcome::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_key_rejects_empty() {
        assert!(matches!(ensure_key(""), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_ensure_key_rejects_delimiter() {
        // a key with '/' would escape the namespace and the cache root
        assert!(matches!(
            ensure_key("../etc/passwd"),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_ensure_key_accepts_plain_names() {
        assert!(ensure_key("prod-bastion.pem").is_ok());
    }
}
