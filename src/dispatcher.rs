//! Request dispatch against one route table generation.

use tracing::{debug, error};

use crate::controller::Registry;
use crate::error::Error;
use crate::method::Method;
use crate::response::{IntoResponse, Response};
use crate::table::RouteTable;

/// Result of dispatching one request.
#[derive(Debug)]
pub enum Outcome {
    /// The controller ran; its response is passed through untouched.
    Handled(Response),
    /// No route for the verb and path, or the controller no longer answers
    /// the verb.
    NotFound,
    /// The route exists but its controller could not be built or failed.
    Failed(Error),
}

/// `NotFound` is `404 Not Found`, `Failed` is `500 Internal Server Error`.
impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Self::Handled(resp) => resp,
            Self::NotFound => Response::not_found(),
            Self::Failed(_) => Response::internal_error(),
        }
    }
}

/// Matches requests against a [`RouteTable`] and runs the controller.
pub struct Dispatcher<'a> {
    table: &'a RouteTable,
    registry: &'a Registry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(table: &'a RouteTable, registry: &'a Registry) -> Self {
        Self { table, registry }
    }

    /// The method is matched in any case; the path must equal the routed path
    /// exactly.
    pub fn handle(&self, method: &str, path: &str) -> Outcome {
        let Some(verb) = Method::normalize(method) else {
            debug!(method, path, "unroutable method");
            return Outcome::NotFound;
        };
        let Some(identity) = self.table.lookup(verb, path) else {
            debug!(%verb, path, "no route");
            return Outcome::NotFound;
        };

        let mut controller = match self.registry.instantiate(identity) {
            Ok(controller) => controller,
            Err(e) => {
                error!(%verb, path, "dispatch failed: {e}");
                return Outcome::Failed(e);
            }
        };

        if !controller.verbs().contains(&verb) {
            debug!(%verb, path, identity, callable = verb.callable(), "controller no longer answers verb");
            return Outcome::NotFound;
        }

        match controller.call(verb) {
            Ok(resp) => Outcome::Handled(resp),
            Err(source) => {
                let e = Error::Handler { identity: identity.to_owned(), verb, source };
                error!(path, "dispatch failed: {e}");
                Outcome::Failed(e)
            }
        }
    }
}
