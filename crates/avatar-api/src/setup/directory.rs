//! Directory service setup

use avatar_core::Config;
use avatar_directory::{create_verifier, IdentityVerifier};
use std::sync::Arc;

pub fn setup_directory(config: &Config) -> Arc<dyn IdentityVerifier> {
    tracing::info!(
        url = %config.ldap_url(),
        base_dn = %config.ldap_base_dn(),
        timeout_secs = config.directory.timeout_secs,
        "Using LDAP identity verifier"
    );
    create_verifier(config)
}
