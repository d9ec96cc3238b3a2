//! Controller trait, type erasure and the identity registry.
//!
//! # How controllers are resolved
//!
//! A route table only stores *identities*: fully-qualified names such as
//! `app::Users`, derived from each artifact in the controller directory. The
//! [`Registry`] maps every identity to a factory that builds a fresh
//! controller, so a cached table can be dispatched without knowing any
//! concrete controller type.
//!
//! ```text
//! impl Controller for Users { … }                 ← user writes this
//!        ↓ registry.register::<Users>("app::Users")
//! Arc::new(|| Ok(Box::new(Users::default())))     ← type-erased factory
//!        ↓  stored as BoxedFactory
//! factory()?.call(Method::Get)   at request time  ← one vtable dispatch
//! ```
//!
//! Every request gets its own controller instance. Nothing is shared between
//! requests except the factory.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{BoxError, Error};
use crate::method::Method;
use crate::response::Response;

/// A handler unit: one controller answers the verbs it declares for the
/// single path its artifact declares with `@url`.
///
/// ```rust
/// use switchyard::{BoxError, Controller, Method, Response};
///
/// #[derive(Default)]
/// struct Users;
///
/// impl Controller for Users {
///     const VERBS: &'static [Method] = &[Method::Get];
///
///     fn call(&mut self, verb: Method) -> Result<Response, BoxError> {
///         match verb {
///             Method::Get => Ok(Response::text("alice")),
///             other => Err(format!("{other} not implemented").into()),
///         }
///     }
/// }
/// ```
pub trait Controller: Send + 'static {
    /// Verbs this controller implements. Fixed per type.
    const VERBS: &'static [Method];

    /// Runs the callable for `verb`. Only ever invoked with a verb listed in
    /// [`VERBS`](Controller::VERBS).
    fn call(&mut self, verb: Method) -> Result<Response, BoxError>;
}

// ── Type erasure ──────────────────────────────────────────────────────────────

/// Object-safe view of a [`Controller`].
pub(crate) trait ErasedController {
    fn verbs(&self) -> &'static [Method];
    fn call(&mut self, verb: Method) -> Result<Response, BoxError>;
}

impl<C: Controller> ErasedController for C {
    fn verbs(&self) -> &'static [Method] {
        C::VERBS
    }

    fn call(&mut self, verb: Method) -> Result<Response, BoxError> {
        Controller::call(self, verb)
    }
}

pub(crate) type BoxedController = Box<dyn ErasedController>;

type BoxedFactory = Arc<dyn Fn() -> Result<BoxedController, BoxError> + Send + Sync + 'static>;

struct Registration {
    verbs: &'static [Method],
    factory: BoxedFactory,
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Identity → controller factory.
///
/// Build it once at startup; each `register*` call returns `self` so
/// registrations chain naturally. Registering the same identity twice keeps
/// the later registration.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `C` under `identity`, built with `C::default()` per request.
    pub fn register<C: Controller + Default>(self, identity: &str) -> Self {
        self.register_with(identity, || Ok(C::default()))
    }

    /// Registers `C` under `identity` with a fallible factory. A factory error
    /// turns the request into a 500.
    pub fn register_with<C, F>(mut self, identity: &str, factory: F) -> Self
    where
        C: Controller,
        F: Fn() -> Result<C, BoxError> + Send + Sync + 'static,
    {
        debug!(identity, verbs = ?C::VERBS, "controller registered");
        let factory: BoxedFactory = Arc::new(move || {
            factory().map(|c| Box::new(c) as BoxedController)
        });
        self.entries.insert(identity.to_owned(), Registration { verbs: C::VERBS, factory });
        self
    }

    /// Verbs declared by the controller registered as `identity`.
    pub fn verbs(&self, identity: &str) -> Option<&'static [Method]> {
        self.entries.get(identity).map(|r| r.verbs)
    }

    /// Builds a fresh controller for `identity`.
    pub(crate) fn instantiate(&self, identity: &str) -> Result<BoxedController, Error> {
        let registration = self
            .entries
            .get(identity)
            .ok_or_else(|| Error::UnknownController(identity.to_owned()))?;
        (registration.factory)().map_err(|source| Error::Construct {
            identity: identity.to_owned(),
            source,
        })
    }
}
