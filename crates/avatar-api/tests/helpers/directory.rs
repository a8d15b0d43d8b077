//! In-process stand-in for the LDAP directory.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use avatar_core::{Credential, Principal};
use avatar_directory::{DirectoryError, DirectoryResult, IdentityVerifier};

pub const TEST_USER: &str = "alice";
pub const TEST_PASSWORD: &str = "wonderland";

pub struct FakeDirectory {
    down: AtomicBool,
    binds: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            down: AtomicBool::new(false),
            binds: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        let directory = Self::new();
        directory.down.store(true, Ordering::SeqCst);
        directory
    }

    pub fn binds(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityVerifier for FakeDirectory {
    async fn verify(
        &self,
        principal_name: &str,
        credential: &Credential,
    ) -> DirectoryResult<Principal> {
        self.binds.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable(
                "connect ldap.test.invalid:389: connection refused".to_string(),
            ));
        }
        if principal_name.eq_ignore_ascii_case(TEST_USER) && credential.expose() == TEST_PASSWORD {
            Ok(Principal::verified(principal_name))
        } else {
            Err(DirectoryError::Unauthorized(format!(
                "rc=49 invalidCredentials for cn={}",
                principal_name
            )))
        }
    }
}
