//! Storage key derivation.
//!
//! Key format: `{normalized principal name}/avatar.png`, where the name is
//! trimmed and lower-cased. The mapping is deterministic: a principal always
//! maps to the same key, whatever case it logged in with.

use std::fmt;

use avatar_core::constants::AVATAR_FILE_NAME;
use avatar_core::models::validate_principal_name;
use avatar_core::Principal;

use crate::traits::{StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key under which `principal`'s canonical avatar lives.
    pub fn for_principal(principal: &Principal) -> StorageResult<Self> {
        validate_principal_name(&principal.name)
            .map_err(|e| StorageError::InvalidKey(e.to_string()))?;
        Ok(StorageKey(format!(
            "{}/{}",
            principal.normalized_name(),
            AVATAR_FILE_NAME
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
