use crate::constants::MAX_PRINCIPAL_NAME_LEN;
use crate::error::AppError;

/// An identity authenticated by the directory for the duration of one request.
///
/// Only an `IdentityVerifier` constructs verified principals; nothing caches them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub verified: bool,
}

impl Principal {
    pub fn verified(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            verified: true,
        }
    }

    /// Name used to address this principal's assets.
    pub fn normalized_name(&self) -> String {
        normalize_principal_name(&self.name)
    }
}

/// Trim and lower-case a principal name so the same user always lands on the same key.
pub fn normalize_principal_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Reject names that cannot safely become the first segment of a storage key.
pub fn validate_principal_name(name: &str) -> Result<(), AppError> {
    let normalized = normalize_principal_name(name);

    if normalized.is_empty() {
        return Err(AppError::BadRequest("username is required".to_string()));
    }
    if normalized.len() > MAX_PRINCIPAL_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "username must be at most {} bytes",
            MAX_PRINCIPAL_NAME_LEN
        )));
    }
    if normalized == "."
        || normalized.contains('/')
        || normalized.contains('\\')
        || normalized.contains("..")
        || normalized.chars().any(char::is_control)
    {
        return Err(AppError::BadRequest(
            "username contains invalid characters".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_principal_name("  Alice "), "alice");
        assert_eq!(Principal::verified("BOB").normalized_name(), "bob");
    }

    #[test]
    fn rejects_path_like_names() {
        for name in ["../etc", "a/b", "a\\b", "..", ".", " . ", "tab\tname"] {
            assert!(
                matches!(validate_principal_name(name), Err(AppError::BadRequest(_))),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_blank_and_oversized_names() {
        assert!(validate_principal_name("   ").is_err());
        assert!(validate_principal_name(&"a".repeat(MAX_PRINCIPAL_NAME_LEN + 1)).is_err());
        assert!(validate_principal_name("alice").is_ok());
        assert!(validate_principal_name("j.doe-42").is_ok());
    }
}
