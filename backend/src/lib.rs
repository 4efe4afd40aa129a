pub mod auth;
pub mod ballotbox;
pub mod catchers;
pub mod config;
pub mod error;
pub mod queries;
pub mod routes;
pub mod server;
pub mod store;
pub use ballotbox_shared::{error::*, models::*};
