//! Unified error type.

use std::path::PathBuf;
use std::time::Duration;

/// Boxed error returned by controller factories and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by switchyard's fallible operations.
///
/// Routing misses are expressed as [`Outcome::NotFound`](crate::Outcome), not
/// as `Error`s. This type surfaces infrastructure failures: filesystem access,
/// cache encoding, configuration, and controllers that fail at dispatch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("io: {0}")]
    Transport(#[from] std::io::Error),

    #[error("route cache `{}` is corrupt: {source}", path.display())]
    CacheCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("route cache encode: {0}")]
    CacheEncode(#[source] serde_json::Error),

    #[error("config `{}`: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("controller scan exceeded {0:?}")]
    ScanTimeout(Duration),

    #[error("no controller registered as `{0}`")]
    UnknownController(String),

    #[error("controller `{identity}` could not be constructed: {source}")]
    Construct {
        identity: String,
        #[source]
        source: BoxError,
    },

    #[error("controller `{identity}` failed handling {verb}: {source}")]
    Handler {
        identity: String,
        verb: crate::Method,
        #[source]
        source: BoxError,
    },

    #[error("invalid socket address `{0}`")]
    Addr(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
