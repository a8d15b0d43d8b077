//! Domain models for one upload request.
//!
//! None of these outlive a single request/response cycle.

mod principal;
mod upload;

pub use principal::{normalize_principal_name, validate_principal_name, Principal};
pub use upload::{Credential, ImagePayload, UploadRequest};
