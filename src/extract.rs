//! Metadata extraction from controller artifacts.
//!
//! An artifact is a small text descriptor, one per controller, named after the
//! controller it describes:
//!
//! ```text
//! // controllers/Users.ctl
//! namespace app;
//!
//! /**
//!  * Lists and creates users.
//!  * @url /users
//!  */
//! ```
//!
//! The first `namespace X;` statement and the file stem give the identity
//! (`app::Users`), `@url` gives the path, and the verbs come from the
//! controller registered under that identity.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::controller::Registry;
use crate::error::Error;
use crate::method::Method;

static NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"namespace\s+([^;]+);").expect("namespace pattern")
});

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@url\s+(\S+)").expect("url pattern")
});

/// One discovered controller: where it routes and what it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerUnit {
    pub identity: String,
    pub path: String,
    pub verbs: Vec<Method>,
}

/// Why an artifact contributed nothing (or less than expected) to the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("`{}` could not be read: {reason}", artifact.display())]
    Unreadable { artifact: PathBuf, reason: String },

    #[error("`{}` names `{identity}`, which no controller is registered as", artifact.display())]
    Unregistered { artifact: PathBuf, identity: String },

    #[error("`{}` (`{identity}`) has no @url annotation", artifact.display())]
    MissingUrl { artifact: PathBuf, identity: String },

    #[error("`{}` (`{identity}`) implements none of the routed verbs", artifact.display())]
    NoVerbs { artifact: PathBuf, identity: String },

    #[error("{verb} {path} declared by `{replaced}` and `{by}`; `{by}` wins")]
    DuplicateRoute { verb: Method, path: String, replaced: String, by: String },
}

/// Reads artifacts and resolves them against a [`Registry`].
pub struct Extractor<'a> {
    registry: &'a Registry,
    candidates: &'a [Method],
}

impl<'a> Extractor<'a> {
    /// `candidates` is the fixed list of verbs to look for, in table order.
    pub fn new(registry: &'a Registry, candidates: &'a [Method]) -> Self {
        Self { registry, candidates }
    }

    /// Extracts the handler unit described by `artifact`.
    pub fn extract(&self, artifact: &Path) -> Result<HandlerUnit, Diagnostic> {
        let unreadable = |reason: String| Diagnostic::Unreadable {
            artifact: artifact.to_owned(),
            reason,
        };

        let stem = artifact
            .file_stem()
            .and_then(OsStr::to_str)
            .ok_or_else(|| unreadable("file name is not valid UTF-8".to_owned()))?;
        // Descriptors are scanned as bytes; stray non-UTF-8 does not hide them.
        let raw = fs::read(artifact).map_err(|e| unreadable(e.to_string()))?;
        let contents = String::from_utf8_lossy(&raw);

        let identity = identity(namespace(&contents), stem);

        let Some(declared) = self.registry.verbs(&identity) else {
            return Err(Diagnostic::Unregistered { artifact: artifact.to_owned(), identity });
        };

        let Some(path) = url(&contents) else {
            return Err(Diagnostic::MissingUrl { artifact: artifact.to_owned(), identity });
        };

        let verbs: Vec<Method> = self
            .candidates
            .iter()
            .copied()
            .filter(|verb| declared.contains(verb))
            .collect();
        if verbs.is_empty() {
            return Err(Diagnostic::NoVerbs { artifact: artifact.to_owned(), identity });
        }

        Ok(HandlerUnit { identity, path: path.to_owned(), verbs })
    }
}

/// Namespace from the first `namespace X;` statement, if any.
pub fn namespace(contents: &str) -> Option<&str> {
    NAMESPACE
        .captures(contents)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|ns| !ns.is_empty())
}

/// Path from the first `@url <path>` annotation, if any.
pub fn url(contents: &str) -> Option<&str> {
    URL.captures(contents).and_then(|c| c.get(1)).map(|m| m.as_str())
}

/// `ns::Stem`, or just `Stem` without a namespace.
pub fn identity(namespace: Option<&str>, stem: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}::{stem}"),
        None => stem.to_owned(),
    }
}

/// Artifacts directly under `dir` with the given extension, sorted by file
/// name. Subdirectories are not entered.
///
/// A missing directory yields no artifacts.
pub fn list_artifacts(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, Error> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "controller directory does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let is_file = entry.file_type().map_err(|e| Error::io(&path, e))?.is_file();
        if is_file && path.extension() == Some(OsStr::new(extension)) {
            artifacts.push(path);
        }
    }
    artifacts.sort();
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Controller;
    use crate::error::BoxError;
    use crate::response::Response;

    #[derive(Default)]
    struct Example;

    impl Controller for Example {
        const VERBS: &'static [Method] = &[Method::Get, Method::Post, Method::Delete];

        fn call(&mut self, _verb: Method) -> Result<Response, BoxError> {
            Ok(Response::text("example"))
        }
    }

    #[derive(Default)]
    struct DeleteOnly;

    impl Controller for DeleteOnly {
        const VERBS: &'static [Method] = &[Method::Delete];

        fn call(&mut self, _verb: Method) -> Result<Response, BoxError> {
            Ok(Response::text("gone"))
        }
    }

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn namespace_takes_first_statement() {
        let src = "namespace app::web;\nnamespace other;\n";
        assert_eq!(namespace(src), Some("app::web"));
        assert_eq!(namespace("namespace   spaced  ;"), Some("spaced"));
        assert_eq!(namespace("no namespace here"), None);
    }

    #[test]
    fn url_takes_first_token() {
        assert_eq!(url(" * @url /users trailing words"), Some("/users"));
        assert_eq!(url("@url\t/tabbed"), Some("/tabbed"));
        assert_eq!(url("@urls"), None);
    }

    #[test]
    fn identity_joins_namespace_and_stem() {
        assert_eq!(identity(Some("app"), "Users"), "app::Users");
        assert_eq!(identity(None, "Users"), "Users");
    }

    #[test]
    fn extracts_candidate_verbs_only() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write(dir.path(), "Example.ctl", "namespace app;\n/** @url /example */\n");
        let registry = Registry::new().register::<Example>("app::Example");

        let unit = Extractor::new(&registry, Method::CANDIDATES).extract(&artifact).unwrap();
        assert_eq!(unit, HandlerUnit {
            identity: "app::Example".into(),
            path: "/example".into(),
            verbs: vec![Method::Get, Method::Post],
        });
    }

    #[test]
    fn missing_url_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write(dir.path(), "Example.ctl", "namespace app;\n/** no route */\n");
        let registry = Registry::new().register::<Example>("app::Example");

        let miss = Extractor::new(&registry, Method::CANDIDATES).extract(&artifact).unwrap_err();
        assert!(matches!(miss, Diagnostic::MissingUrl { identity, .. } if identity == "app::Example"));
    }

    #[test]
    fn unregistered_identity_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write(dir.path(), "Example.ctl", "/** @url /example */\n");
        let registry = Registry::new().register::<Example>("app::Example");

        let miss = Extractor::new(&registry, Method::CANDIDATES).extract(&artifact).unwrap_err();
        assert!(matches!(miss, Diagnostic::Unregistered { identity, .. } if identity == "Example"));
    }

    #[test]
    fn controller_without_candidate_verbs_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = write(dir.path(), "DeleteOnly.ctl", "@url /gone\n");
        let registry = Registry::new().register::<DeleteOnly>("DeleteOnly");

        let miss = Extractor::new(&registry, Method::CANDIDATES).extract(&artifact).unwrap_err();
        assert!(matches!(miss, Diagnostic::NoVerbs { .. }));

        let unit = Extractor::new(&registry, &[Method::Delete]).extract(&artifact).unwrap();
        assert_eq!(unit.verbs, vec![Method::Delete]);
    }

    #[test]
    fn invalid_utf8_contents_still_extract() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("Example.ctl");
        fs::write(&artifact, b"namespace app;\n/** caf\xe9 \xff\n * @url /example\n */\n").unwrap();
        let registry = Registry::new().register::<Example>("app::Example");

        let unit = Extractor::new(&registry, Method::CANDIDATES).extract(&artifact).unwrap();
        assert_eq!(unit.identity, "app::Example");
        assert_eq!(unit.path, "/example");
    }

    #[test]
    fn missing_artifact_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("Gone.ctl");
        let registry = Registry::new().register::<Example>("Gone");

        let miss = Extractor::new(&registry, Method::CANDIDATES).extract(&artifact).unwrap_err();
        assert!(matches!(miss, Diagnostic::Unreadable { artifact: a, .. } if a == artifact));
    }

    // Other unix filesystems may refuse non-UTF-8 names outright.
    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_name_is_unreadable() {
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join(OsStr::from_bytes(b"Bad\xff.ctl"));
        fs::write(&artifact, "@url /bad\n").unwrap();
        let registry = Registry::new().register::<Example>("Example");

        let miss = Extractor::new(&registry, Method::CANDIDATES).extract(&artifact).unwrap_err();
        assert!(matches!(miss, Diagnostic::Unreadable { reason, .. } if reason.contains("UTF-8")));
    }

    #[test]
    fn list_is_flat_filtered_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.ctl", "");
        write(dir.path(), "a.ctl", "");
        write(dir.path(), "notes.txt", "");
        fs::create_dir(dir.path().join("nested.ctl")).unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        write(&dir.path().join("sub"), "c.ctl", "");

        let found = list_artifacts(dir.path(), "ctl").unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.ctl", "b.ctl"]);
    }

    #[test]
    fn list_of_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_artifacts(&dir.path().join("absent"), "ctl").unwrap().is_empty());
    }
}
