//! Error taxonomy for pemstore.
//!
//! Errors come in two tiers: "known" errors are precondition violations the
//! user can fix (wrong key, missing file, forgot `--force`) and map to exit
//! code 1; everything coming out of the remote store or the local filesystem
//! is "unknown" and maps to exit code 2.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid key {0:?}: must be non-empty and must not contain '/'")]
    InvalidKey(String),

    #[error("specified key already exists: {0} (re-run with --force to overwrite)")]
    KeyExists(String),

    #[error("couldn't find specified key: {0}")]
    KeyNotFound(String),

    #[error("file already exists; clean before get: {}", .0.display())]
    LocalConflict(PathBuf),

    #[error("no such file: {}", .0.display())]
    LocalNotFound(PathBuf),

    #[error("HOME is not set; cannot locate the local pemstore")]
    HomeNotSet,

    #[error("PEMSTORE_MFA_SERIAL is not set; required with --mfa")]
    MfaSerialMissing,

    #[error("empty MFA token code")]
    MfaTokenEmpty,

    #[error("pem data is not valid UTF-8 text")]
    NotUtf8,

    #[error("remote store call failed: {0}")]
    Remote(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("i/o failure at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns `true` for precondition failures the user can correct without
    /// touching code or credentials; `false` for remote/IO failures.
    pub fn is_known(&self) -> bool {
        !matches!(self, Error::Remote(_) | Error::Io { .. })
    }

    pub(crate) fn remote(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Remote(Box::new(err))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_errors_are_known() {
        assert!(Error::KeyExists("a".into()).is_known());
        assert!(Error::KeyNotFound("a".into()).is_known());
        assert!(Error::LocalConflict(PathBuf::from("/tmp/x")).is_known());
        assert!(Error::LocalNotFound(PathBuf::from("/tmp/x")).is_known());
        assert!(Error::InvalidKey(String::new()).is_known());
    }

    #[test]
    fn test_transport_and_io_errors_are_unknown() {
        assert!(!Error::Remote("connection reset".to_string().into()).is_known());
        assert!(
            !Error::io(
                "/tmp/x",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")
            )
            .is_known()
        );
    }
}
