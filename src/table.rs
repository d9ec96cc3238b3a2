//! The route table: verb → path → controller identity.
//!
//! Exact-match only. No wildcards, no parameters, no trailing-slash folding.
//! Two paths that differ by one byte are two different routes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::method::Method;

/// The complete mapping used for dispatch.
///
/// Serializes as a two-level JSON object, `{"GET": {"/users": "app::Users"}}`.
/// `BTreeMap` keeps the encoding stable so identical tables produce identical
/// cache files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    routes: BTreeMap<Method, BTreeMap<String, String>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `verb path` to `identity`, returning the identity it replaced.
    pub fn insert(&mut self, verb: Method, path: &str, identity: &str) -> Option<String> {
        self.routes
            .entry(verb)
            .or_default()
            .insert(path.to_owned(), identity.to_owned())
    }

    /// Identity bound to `verb path`, compared byte for byte.
    pub fn lookup(&self, verb: Method, path: &str) -> Option<&str> {
        self.routes.get(&verb)?.get(path).map(String::as_str)
    }

    /// Number of (verb, path) entries.
    pub fn len(&self) -> usize {
        self.routes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every entry as `(verb, path, identity)`, ordered by verb then path.
    pub fn iter(&self) -> impl Iterator<Item = (Method, &str, &str)> {
        self.routes.iter().flat_map(|(verb, paths)| {
            paths.iter().map(move |(path, id)| (*verb, path.as_str(), id.as_str()))
        })
    }
}
