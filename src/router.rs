//! The application router.
//!
//! Owns the configuration, the controller registry and the current route
//! table. Build it once at startup, refresh it when you want controller
//! changes picked up, and hand it to [`Server::serve`](crate::Server::serve).

use std::time::Duration;

use crate::cache::CacheStore;
use crate::config::RouterConfig;
use crate::controller::Registry;
use crate::discovery::{Discovery, Report};
use crate::dispatcher::{Dispatcher, Outcome};
use crate::error::Error;
use crate::response::{IntoResponse, Response};
use crate::table::RouteTable;

/// Controller-discovery router.
///
/// Each refresh replaces the route table wholesale; dispatch always sees one
/// complete generation.
pub struct Router {
    config: RouterConfig,
    registry: Registry,
    store: CacheStore,
    table: RouteTable,
}

impl Router {
    /// A router with an empty table. Nothing is read until the first refresh.
    pub fn new(config: RouterConfig, registry: Registry) -> Self {
        let store = CacheStore::new(&config.cache_path);
        Self { config, registry, store, table: RouteTable::new() }
    }

    /// [`new`](Self::new) followed by [`refresh`](Self::refresh).
    pub fn open(config: RouterConfig, registry: Registry) -> Result<Self, Error> {
        let mut router = Self::new(config, registry);
        router.refresh()?;
        Ok(router)
    }

    /// Loads the table from the cache, or rebuilds it when the cache is
    /// missing, corrupt, or older than `min_cache_age` with a controller
    /// modified after it.
    ///
    /// On error the previous table stays in place.
    pub fn load_controllers(&mut self, min_cache_age: Duration) -> Result<Report, Error> {
        self.reload(false, min_cache_age)
    }

    /// [`load_controllers`](Self::load_controllers) with the configured
    /// minimum cache age.
    pub fn refresh(&mut self) -> Result<Report, Error> {
        self.reload(false, self.config.min_cache_age)
    }

    /// Rescans every controller and overwrites the cache, whatever its age.
    pub fn rebuild(&mut self) -> Result<Report, Error> {
        self.reload(true, self.config.min_cache_age)
    }

    fn reload(&mut self, force: bool, min_cache_age: Duration) -> Result<Report, Error> {
        let discovery = Discovery::new(&self.config, &self.registry, &self.store);
        let (table, report) = discovery.refresh(force, min_cache_age)?;
        self.table = table;
        Ok(report)
    }

    /// Dispatches one request.
    pub fn handle(&self, method: &str, path: &str) -> Outcome {
        Dispatcher::new(&self.table, &self.registry).handle(method, path)
    }

    /// Dispatches one request and renders misses and failures:
    /// `404 Not Found` / `500 Internal Server Error`.
    pub fn run(&self, method: &str, uri: &str) -> Response {
        self.handle(method, uri).into_response()
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }
}
