pub mod error;
pub mod models;

pub use error::{ErrorBody, ErrorCode};
pub use models::*;

#[cfg(test)]
mod tests;
