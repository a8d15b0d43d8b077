//! Avatar API Library
//!
//! HTTP surface of the avatar ingestion service: request extraction, the
//! upload handler, error rendering, middleware and application setup.

mod handlers;
mod middleware;
mod telemetry;

pub mod error;
pub mod extract;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
