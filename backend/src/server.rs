use std::sync::Arc;

use rocket::{catchers, Build, Rocket};
use tracing::info;

use crate::auth::SharedSecretAuth;
use crate::ballotbox::BallotBox;
use crate::catchers::{bad_request, internal_error, not_found, unauthorized, unprocessable};
use crate::config::Config;
use crate::store::BallotStore;

/// Everything a module needs to initialise itself. Built once by the host
/// and handed to each module explicitly.
pub struct ServerContext {
    pub config: Config,
    pub store: Arc<dyn BallotStore>,
}

impl ServerContext {
    pub fn new(config: Config, store: Arc<dyn BallotStore>) -> Self {
        Self { config, store }
    }
}

/// A self-contained group of routes mounted onto the server.
pub trait Module: Send + Sync {
    fn name(&self) -> &'static str;

    fn init(self: Box<Self>, rocket: Rocket<Build>) -> Rocket<Build>;
}

pub fn compose(mut rocket: Rocket<Build>, modules: Vec<Box<dyn Module>>) -> Rocket<Build> {
    for module in modules {
        info!("📦 Registering module {}", module.name());
        rocket = module.init(rocket);
    }
    rocket
}

/// The full service: shared permission checking, JSON catchers and every
/// module, wired over `ctx`.
pub fn build(ctx: ServerContext) -> Rocket<Build> {
    let modules: Vec<Box<dyn Module>> = vec![Box::new(BallotBox::new(&ctx))];

    let rocket = rocket::build()
        .manage(SharedSecretAuth::from_config(&ctx.config))
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                unprocessable,
                internal_error
            ],
        );

    compose(rocket, modules)
}
