//! # switchyard
//!
//! A minimal HTTP router that finds its routes on disk.
//!
//! Each controller has a small artifact in a controller directory naming its
//! namespace and its path:
//!
//! ```text
//! // controllers/Users.ctl
//! namespace app;
//! /** @url /users */
//! ```
//!
//! and a Rust type registered under the same identity (`app::Users`). The
//! router scans the directory, builds a verb → path → identity table, caches
//! it in one file, and dispatches `(method, path)` pairs to the controller.
//!
//! What switchyard does:
//!
//! - Exact-match routing — the path is compared byte for byte; only the
//!   method is case-normalized
//! - A cached route table — trusted for a debounce window, then revalidated
//!   against controller modification times, rebuilt wholesale when stale
//! - Safe cache writes — single-writer lock plus atomic rename
//! - A `404 Not Found` for everything that does not route
//!
//! What it deliberately leaves out: path parameters, middleware, content
//! negotiation.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use switchyard::{BoxError, Controller, Method, Registry, Response, Router, RouterConfig, Server};
//!
//! #[derive(Default)]
//! struct Users;
//!
//! impl Controller for Users {
//!     const VERBS: &'static [Method] = &[Method::Get, Method::Post];
//!
//!     fn call(&mut self, verb: Method) -> Result<Response, BoxError> {
//!         Ok(match verb {
//!             Method::Post => Response::text("created"),
//!             _ => Response::json(br#"[{"id":1}]"#.to_vec()),
//!         })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), switchyard::Error> {
//!     let registry = Registry::new().register::<Users>("app::Users");
//!     let router = Router::open(RouterConfig::new("controllers", "routes.cache"), registry)?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(router).await
//! }
//! ```

mod cache;
mod config;
mod controller;
mod discovery;
mod dispatcher;
mod error;
mod method;
mod response;
mod router;
mod server;
mod status;
mod table;

pub mod extract;

pub use cache::{CacheStore, Save};
pub use config::{RouterConfig, DEFAULT_MIN_CACHE_AGE};
pub use controller::{Controller, Registry};
pub use discovery::{Discovery, Report, Source};
pub use dispatcher::{Dispatcher, Outcome};
pub use error::{BoxError, Error};
pub use extract::{Diagnostic, HandlerUnit};
pub use method::Method;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{serve_on, Server};
pub use status::Status;
pub use table::RouteTable;
