//! Identity verification against a directory service.
//!
//! [`IdentityVerifier`] is the seam the ingestion pipeline authenticates
//! through. [`LdapVerifier`] binds to an LDAP server; [`ThrottledVerifier`]
//! optionally wraps any verifier with a per-principal bind-failure limit.

pub mod factory;
pub mod ldap;
pub mod throttle;
pub mod traits;

pub use factory::create_verifier;
pub use ldap::LdapVerifier;
pub use throttle::{BindFailureLimiter, BindPermit, ThrottledVerifier};
pub use traits::{DirectoryError, DirectoryResult, IdentityVerifier};
