//! Minimal switchyard example — two controllers discovered from a directory.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users
//!   curl -X POST http://localhost:3000/users
//!   curl http://localhost:3000/healthz
//!   curl -X POST http://localhost:3000/healthz   # 404: health only answers GET

use std::fs;

use switchyard::{
    BoxError, Controller, Method, Registry, Response, Router, RouterConfig, Server, Status,
};

#[derive(Default)]
struct Users;

impl Controller for Users {
    const VERBS: &'static [Method] = &[Method::Get, Method::Post];

    fn call(&mut self, verb: Method) -> Result<Response, BoxError> {
        Ok(match verb {
            Method::Post => Response::builder()
                .status(Status::Created)
                .header("location", "/users/99")
                .json(br#"{"id":"99","name":"new_user"}"#.to_vec()),
            _ => Response::json(br#"[{"id":"42","name":"alice"}]"#.to_vec()),
        })
    }
}

#[derive(Default)]
struct Health;

impl Controller for Health {
    const VERBS: &'static [Method] = &[Method::Get];

    fn call(&mut self, _verb: Method) -> Result<Response, BoxError> {
        Ok(Response::text("ok"))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let root = std::env::temp_dir().join("switchyard-demo");
    let controllers = root.join("controllers");
    fs::create_dir_all(&controllers)?;
    fs::write(controllers.join("Users.ctl"), "namespace demo;\n/** @url /users */\n")?;
    fs::write(controllers.join("Health.ctl"), "namespace demo;\n/** @url /healthz */\n")?;

    let registry = Registry::new()
        .register::<Users>("demo::Users")
        .register::<Health>("demo::Health");

    let mut router = Router::new(RouterConfig::new(&controllers, root.join("routes.cache")), registry);
    let report = router.refresh()?;
    for miss in &report.diagnostics {
        eprintln!("skipped: {miss}");
    }

    Server::bind("0.0.0.0:3000")?.serve(router).await?;
    Ok(())
}
