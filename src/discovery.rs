//! Controller discovery: trust the cache, or rebuild the table from scratch.
//!
//! A rebuild always re-extracts every artifact and replaces the cache
//! wholesale. There is no incremental update: one touched controller costs a
//! full scan.
//!
//! Artifacts are visited in file-name order. When two controllers declare the
//! same verb and path, the one visited last keeps the route and a
//! [`Diagnostic::DuplicateRoute`] records the loser.

use std::time::{Duration, Instant, SystemTime};

use tracing::{info, warn};

use crate::cache::{CacheStore, Save};
use crate::config::RouterConfig;
use crate::controller::Registry;
use crate::error::Error;
use crate::extract::{list_artifacts, Diagnostic, Extractor};
use crate::table::RouteTable;

/// Where a refreshed table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cached,
    Rebuilt,
}

/// Summary of one refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub source: Source,
    pub routes: usize,
    /// Misses and duplicates found by a rebuild. Always empty for a cache hit.
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds route tables for one controller directory and cache.
pub struct Discovery<'a> {
    config: &'a RouterConfig,
    registry: &'a Registry,
    store: &'a CacheStore,
}

impl<'a> Discovery<'a> {
    pub fn new(config: &'a RouterConfig, registry: &'a Registry, store: &'a CacheStore) -> Self {
        Self { config, registry, store }
    }

    /// Returns the cached table when it is present, decodes, and is not stale
    /// for `min_age`; otherwise rebuilds. `force` always rebuilds.
    pub fn refresh(&self, force: bool, min_age: Duration) -> Result<(RouteTable, Report), Error> {
        let fresh = !force
            && !self.store.is_stale(&self.config.controller_dir, &self.config.extension, min_age)?;

        if fresh {
            match self.store.load() {
                Ok(table) => {
                    info!(routes = table.len(), cache = %self.store.path().display(), "route table loaded from cache");
                    let report = Report { source: Source::Cached, routes: table.len(), diagnostics: Vec::new() };
                    return Ok((table, report));
                }
                Err(e) => warn!("route cache unusable, rebuilding: {e}"),
            }
        }

        self.rebuild()
    }

    /// Scans every artifact and overwrites the cache with the result.
    pub fn rebuild(&self) -> Result<(RouteTable, Report), Error> {
        let scanned_at = SystemTime::now();
        let (table, diagnostics) = self.scan()?;

        // Stamped with the scan start: edits made while scanning stay newer.
        match self.store.save(&table, scanned_at)? {
            Save::Written => {}
            Save::Skipped => info!("route table rebuilt but cache left to the concurrent writer"),
        }

        info!(routes = table.len(), misses = diagnostics.len(), "route table rebuilt");
        let report = Report { source: Source::Rebuilt, routes: table.len(), diagnostics };
        Ok((table, report))
    }

    /// Extracts every artifact into a new table without touching the cache.
    pub fn scan(&self) -> Result<(RouteTable, Vec<Diagnostic>), Error> {
        let started = Instant::now();
        let extractor = Extractor::new(self.registry, &self.config.verbs);
        let mut table = RouteTable::new();
        let mut diagnostics = Vec::new();

        for artifact in list_artifacts(&self.config.controller_dir, &self.config.extension)? {
            if let Some(limit) = self.config.scan_timeout {
                if started.elapsed() >= limit {
                    warn!(limit = ?limit, "controller scan timed out");
                    return Err(Error::ScanTimeout(limit));
                }
            }

            let unit = match extractor.extract(&artifact) {
                Ok(unit) => unit,
                Err(miss) => {
                    warn!("controller skipped: {miss}");
                    diagnostics.push(miss);
                    continue;
                }
            };

            for verb in &unit.verbs {
                if let Some(replaced) = table.insert(*verb, &unit.path, &unit.identity) {
                    let duplicate = Diagnostic::DuplicateRoute {
                        verb: *verb,
                        path: unit.path.clone(),
                        replaced,
                        by: unit.identity.clone(),
                    };
                    warn!("{duplicate}");
                    diagnostics.push(duplicate);
                }
            }
        }

        Ok((table, diagnostics))
    }
}
