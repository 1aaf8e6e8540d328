//! HTTP surface over the operation workflow
//!
//! Handlers translate requests into [`Workflow`](crate::workflow::Workflow)
//! calls on the blocking pool and map failures to JSON error bodies.

mod error;
pub mod models;
mod server;
pub mod services;
pub mod state;
pub(crate) mod utils;
mod validation;

pub use error::ApiError;
pub use server::{router, run};
pub use state::AppState;
pub use validation::PASSPHRASE_HEADER;
