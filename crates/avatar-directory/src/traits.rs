use async_trait::async_trait;
use avatar_core::{AppError, Credential, Principal};
use thiserror::Error;

/// Directory operation errors
///
/// `Unauthorized` means the directory answered and rejected the identity.
/// `Unavailable` means no trustworthy answer was obtained. Callers must not
/// treat one as the other.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Bind rejected: {0}")]
    Unauthorized(String),

    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Too many failed binds for {0}")]
    TooManyAttempts(String),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Unauthorized(msg) => AppError::Unauthorized(msg),
            DirectoryError::Unavailable(msg) => AppError::DirectoryUnavailable(msg),
            DirectoryError::TooManyAttempts(msg) => AppError::TooManyAttempts(msg),
        }
    }
}

/// Proves that a (name, credential) pair belongs to a known principal.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Returns a verified [`Principal`] carrying `principal_name` as given.
    async fn verify(
        &self,
        principal_name: &str,
        credential: &Credential,
    ) -> DirectoryResult<Principal>;
}
