use std::time::{Duration, Instant};

use async_trait::async_trait;
use avatar_core::{Config, Credential, Principal};
use ldap3::{LdapConnAsync, LdapConnSettings};

use crate::traits::{DirectoryError, DirectoryResult, IdentityVerifier};

// RFC 4511 result codes that mean "the directory rejected this identity".
const RC_SUCCESS: u32 = 0;
const RC_NO_SUCH_OBJECT: u32 = 32;
const RC_INAPPROPRIATE_AUTHENTICATION: u32 = 48;
const RC_INVALID_CREDENTIALS: u32 = 49;
const RC_INSUFFICIENT_ACCESS_RIGHTS: u32 = 50;

/// Simple-bind verifier.
///
/// Each call opens one connection, binds as `cn={name},{base_dn}`, and unbinds.
/// Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct LdapVerifier {
    url: String,
    base_dn: String,
    timeout: Duration,
}

impl LdapVerifier {
    pub fn new(url: impl Into<String>, base_dn: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            base_dn: base_dn.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ldap_url(),
            config.ldap_base_dn(),
            Duration::from_secs(config.directory.timeout_secs),
        )
    }

    /// Bind DN for `principal_name`, escaped per RFC 4514.
    pub fn user_dn(&self, principal_name: &str) -> String {
        format!("cn={},{}", ldap3::dn_escape(principal_name), self.base_dn)
    }
}

/// Map a bind result code onto the verifier's error kinds.
pub(crate) fn classify_bind_result(rc: u32, text: &str) -> DirectoryResult<()> {
    match rc {
        RC_SUCCESS => Ok(()),
        RC_NO_SUCH_OBJECT
        | RC_INAPPROPRIATE_AUTHENTICATION
        | RC_INVALID_CREDENTIALS
        | RC_INSUFFICIENT_ACCESS_RIGHTS => Err(DirectoryError::Unauthorized(format!(
            "rc={} {}",
            rc, text
        ))),
        _ => Err(DirectoryError::Unavailable(format!("rc={} {}", rc, text))),
    }
}

#[async_trait]
impl IdentityVerifier for LdapVerifier {
    #[tracing::instrument(skip(self, credential), fields(url = %self.url))]
    async fn verify(
        &self,
        principal_name: &str,
        credential: &Credential,
    ) -> DirectoryResult<Principal> {
        // An empty password turns a simple bind into an unauthenticated bind,
        // which many servers accept.
        if credential.is_empty() {
            return Err(DirectoryError::Unauthorized("empty credential".to_string()));
        }

        let start = Instant::now();
        let settings = LdapConnSettings::new().set_conn_timeout(self.timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &self.url)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "LDAP connection failed"
                );
                DirectoryError::Unavailable(e.to_string())
            })?;

        // The driver task ends once every handle to the connection is dropped,
        // including when this future is cancelled mid-bind.
        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                tracing::warn!(error = %e, "LDAP connection error");
            }
        });

        let dn = self.user_dn(principal_name);
        let outcome = ldap
            .with_timeout(self.timeout)
            .simple_bind(&dn, credential.expose())
            .await;

        if let Err(e) = ldap.unbind().await {
            tracing::debug!(error = %e, "LDAP unbind failed");
        }

        let result = outcome.map_err(|e| {
            tracing::error!(
                error = %e,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "LDAP bind did not complete"
            );
            DirectoryError::Unavailable(e.to_string())
        })?;

        classify_bind_result(result.rc, &result.text)?;

        tracing::debug!(
            principal = %principal_name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "LDAP bind successful"
        );

        Ok(Principal::verified(principal_name))
    }
}
