//! Shared fixtures: scratch controller directories and sample controllers.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use switchyard::{BoxError, Controller, Method, Registry, Response, RouterConfig};
use tempfile::TempDir;

pub const HOUR: Duration = Duration::from_secs(3600);

/// A scratch app: `controllers/` plus a cache path beside it.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("controllers")).unwrap();
        Self { dir }
    }

    pub fn controllers(&self) -> PathBuf {
        self.dir.path().join("controllers")
    }

    pub fn cache(&self) -> PathBuf {
        self.dir.path().join("routes.cache")
    }

    pub fn config(&self) -> RouterConfig {
        RouterConfig::new(self.controllers(), self.cache())
    }

    /// Writes `controllers/<name>.ctl`.
    pub fn artifact(&self, name: &str, namespace: Option<&str>, url: Option<&str>) -> PathBuf {
        let mut src = String::new();
        if let Some(ns) = namespace {
            src.push_str(&format!("namespace {ns};\n\n"));
        }
        src.push_str("/**\n * Test controller.\n");
        if let Some(url) = url {
            src.push_str(&format!(" * @url {url}\n"));
        }
        src.push_str(" */\n");

        let path = self.controllers().join(format!("{name}.ctl"));
        fs::write(&path, src).unwrap();
        path
    }
}

/// Sets the modification time of an existing file.
pub fn set_mtime(path: &Path, at: SystemTime) {
    File::options().write(true).open(path).unwrap().set_modified(at).unwrap();
}

#[derive(Default)]
pub struct Example;

impl Controller for Example {
    const VERBS: &'static [Method] = &[Method::Get, Method::Post];

    fn call(&mut self, verb: Method) -> Result<Response, BoxError> {
        Ok(Response::text(format!("example {}", verb.callable())))
    }
}

#[derive(Default)]
pub struct ReadOnly;

impl Controller for ReadOnly {
    const VERBS: &'static [Method] = &[Method::Get];

    fn call(&mut self, _verb: Method) -> Result<Response, BoxError> {
        Ok(Response::text("read only"))
    }
}

#[derive(Default)]
pub struct First;

impl Controller for First {
    const VERBS: &'static [Method] = &[Method::Get];

    fn call(&mut self, _verb: Method) -> Result<Response, BoxError> {
        Ok(Response::text("first"))
    }
}

#[derive(Default)]
pub struct Second;

impl Controller for Second {
    const VERBS: &'static [Method] = &[Method::Get];

    fn call(&mut self, _verb: Method) -> Result<Response, BoxError> {
        Ok(Response::text("second"))
    }
}

pub fn registry() -> Registry {
    Registry::new()
        .register::<Example>("app::Example")
        .register::<ReadOnly>("app::ReadOnly")
        .register::<First>("First")
        .register::<Second>("Second")
}
