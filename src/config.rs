//! Router configuration.
//!
//! Every field has a default, so an empty TOML file is a valid configuration:
//!
//! ```toml
//! controller_dir = "controllers"
//! extension = "ctl"
//! cache_path = "routes.cache"
//! min_cache_age_secs = 3600
//! verbs = ["GET", "POST"]
//! scan_timeout_secs = 5      # optional, unbounded when absent
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::method::Method;

/// How long a cache is trusted before controller mtimes are checked again.
pub const DEFAULT_MIN_CACHE_AGE: Duration = Duration::from_secs(3600);

/// Where controllers live, where the route cache goes, and how eagerly it is
/// revalidated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Directory scanned (non-recursively) for controller artifacts.
    pub controller_dir: PathBuf,

    /// Artifact file extension, without the dot.
    pub extension: String,

    /// Fixed location of the serialized route table.
    pub cache_path: PathBuf,

    /// Debounce window for [`Router::refresh`](crate::Router::refresh).
    #[serde(rename = "min_cache_age_secs", with = "secs")]
    pub min_cache_age: Duration,

    /// Verbs looked up on each controller, in this order.
    pub verbs: Vec<Method>,

    /// Upper bound on one full rebuild.
    #[serde(rename = "scan_timeout_secs", with = "opt_secs")]
    pub scan_timeout: Option<Duration>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            controller_dir: PathBuf::from("controllers"),
            extension: "ctl".to_owned(),
            cache_path: PathBuf::from("routes.cache"),
            min_cache_age: DEFAULT_MIN_CACHE_AGE,
            verbs: Method::CANDIDATES.to_vec(),
            scan_timeout: None,
        }
    }
}

impl RouterConfig {
    /// Defaults with the controller directory and cache path replaced.
    pub fn new(controller_dir: impl Into<PathBuf>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            controller_dir: controller_dir.into(),
            cache_path: cache_path.into(),
            ..Self::default()
        }
    }

    /// Reads a TOML configuration file.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_owned(),
            source,
        })
    }
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|secs| secs.map(Duration::from_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert_eq!(config.min_cache_age, Duration::from_secs(3600));
        assert_eq!(config.verbs, vec![Method::Get, Method::Post]);
    }

    #[test]
    fn reads_every_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.toml");
        fs::write(&path, r#"
            controller_dir = "app/controllers"
            extension = "route"
            cache_path = "/tmp/app.routes"
            min_cache_age_secs = 60
            verbs = ["GET", "PUT", "DELETE"]
            scan_timeout_secs = 5
        "#).unwrap();

        let config = RouterConfig::from_file(&path).unwrap();
        assert_eq!(config.controller_dir, PathBuf::from("app/controllers"));
        assert_eq!(config.extension, "route");
        assert_eq!(config.cache_path, PathBuf::from("/tmp/app.routes"));
        assert_eq!(config.min_cache_age, Duration::from_secs(60));
        assert_eq!(config.verbs, vec![Method::Get, Method::Put, Method::Delete]);
        assert_eq!(config.scan_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn unknown_verb_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("router.toml");
        fs::write(&path, r#"verbs = ["BREW"]"#).unwrap();

        assert!(matches!(RouterConfig::from_file(&path), Err(Error::Config { .. })));
    }
}
