use std::sync::Arc;

use ballotbox::{config::Config, queries::PgBallotStore, server::{self, ServerContext}};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::info;

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting ballot box server");

    let config = Config::from_secrets(&secret_store).map_err(CustomError::new)?;
    info!(session_expire = %config.session_expire(), "Loaded configuration");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(CustomError::new)?;

    info!("📋 Migrations complete");

    let store = PgBallotStore::prepare(pool)
        .await
        .map_err(CustomError::new)?;

    let rocket = server::build(ServerContext::new(config, Arc::new(store)));

    Ok(rocket.into())
}
