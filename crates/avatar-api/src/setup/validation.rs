//! Configuration validation
//!
//! `Config::from_source` already rejects inconsistent values. These checks
//! cover what only the HTTP layer and the compiled feature set know about.

use anyhow::Result;
use avatar_core::Config;
use axum::http::HeaderValue;

/// Validate settings that depend on this binary's build and HTTP stack
pub fn validate_config(config: &Config) -> Result<()> {
    for origin in config.cors_origins() {
        if origin != "*" && origin.parse::<HeaderValue>().is_err() {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS contains an invalid origin: {}",
                origin
            ));
        }
    }

    if config.directory.use_tls && !cfg!(feature = "tls") {
        return Err(anyhow::anyhow!(
            "LDAP_USE_TLS=true requires building avatar-api with the `tls` feature"
        ));
    }

    if config.is_production() {
        if let Some(endpoint) = config.s3_endpoint() {
            if endpoint.starts_with("http://") {
                tracing::warn!(
                    endpoint = %endpoint,
                    "S3 endpoint uses plain HTTP in production"
                );
            }
        }
        if !config.directory.use_tls {
            tracing::warn!("LDAP binds are sent without TLS in production");
        }
    }

    if config.request_timeout_secs() <= config.directory.timeout_secs {
        tracing::warn!(
            request_timeout_secs = config.request_timeout_secs(),
            ldap_timeout_secs = config.directory.timeout_secs,
            "REQUEST_TIMEOUT_SECS does not leave room for the LDAP timeout"
        );
    }

    Ok(())
}
