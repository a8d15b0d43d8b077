use std::sync::Arc;

use avatar_core::Config;

use crate::{IdentityVerifier, LdapVerifier, ThrottledVerifier};

/// Build the verifier described by `config`, throttled when
/// `BIND_FAILURE_LIMIT` is non-zero.
pub fn create_verifier(config: &Config) -> Arc<dyn IdentityVerifier> {
    let ldap: Arc<dyn IdentityVerifier> = Arc::new(LdapVerifier::from_config(config));

    let limit = config.directory.bind_failure_limit;
    if limit == 0 {
        return ldap;
    }

    tracing::info!(
        max_failures = limit,
        window_secs = config.directory.bind_failure_window_secs,
        "Bind failure throttle enabled"
    );
    Arc::new(ThrottledVerifier::new(
        ldap,
        limit,
        config.directory.bind_failure_window_secs,
    ))
}
