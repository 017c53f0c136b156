//! Remote secret storage.
//!
//! [`SecretStore`] is the async trait covering the five remote operations
//! (list, exists, get, store, remove). [`SsmStore`] implements it against
//! AWS SSM Parameter Store; tests drive the command layer with an in-memory
//! implementation instead.

mod ssm;

pub use ssm::SsmStore;

use crate::error::Result;

/// CRUD-plus-list surface of the remote parameter store.
///
/// Keys are bare, user-facing names; implementations apply the namespace
/// prefix themselves before touching the remote store.
#[async_trait::async_trait]
pub trait SecretStore: Send + Sync {
    /// All bare key names under the namespace, in store order.
    async fn list(&self) -> Result<Vec<String>>;

    /// Whether a parameter exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Fetches the value of `key`, decrypting server-side when `decrypt`
    /// is set.
    async fn get(&self, key: &str, decrypt: bool) -> Result<Vec<u8>>;

    /// Writes `data` under `key` as an encrypted parameter. `overwrite` is
    /// forwarded to the remote store unexamined; overwrite *policy* lives
    /// with the caller, which is expected to check [`Self::exists`] first.
    async fn store(&self, key: &str, data: &[u8], overwrite: bool) -> Result<()>;

    /// Deletes the parameter for `key`.
    async fn remove(&self, key: &str) -> Result<()>;
}
