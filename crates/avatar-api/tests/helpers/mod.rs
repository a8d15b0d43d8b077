//! Test helpers: build the real router over in-process collaborators.
//!
//! Run from workspace root: `cargo test -p avatar-api`.

#![allow(dead_code)]

pub mod directory;
pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;

use avatar_api::setup::routes;
use avatar_api::AppState;
use avatar_core::{Config, Principal};
use avatar_storage::{AssetStore, S3Storage, StorageKey};
use axum_test::TestServer;
use bytes::Bytes;

pub use directory::{FakeDirectory, TEST_PASSWORD, TEST_USER};

/// Test application: server plus the store it writes to.
pub struct TestApp {
    pub server: TestServer,
    pub storage: Arc<S3Storage>,
    pub directory: Arc<FakeDirectory>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Current avatar bytes for `name`, if any.
    pub async fn stored_avatar(&self, name: &str) -> Option<Bytes> {
        let key = StorageKey::for_principal(&Principal::verified(name)).ok()?;
        self.storage.get(&key).await.ok()
    }
}

pub fn create_test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("LDAP_SERVER", "ldap.test.invalid"),
        ("LDAP_BASE_USER_DN", "ou=users,dc=test,dc=invalid"),
        ("STORAGE_BACKEND", "memory"),
        ("S3_BUCKET", "test-avatars"),
        ("MAX_UPLOAD_SIZE_MB", "1"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_source(|key| vars.get(key).cloned()).expect("valid test config")
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(FakeDirectory::new(), &[])
}

pub fn setup_test_app_with(directory: FakeDirectory, extra: &[(&str, &str)]) -> TestApp {
    let config = create_test_config(extra);
    let storage = Arc::new(S3Storage::in_memory(config.s3_bucket()));
    let directory = Arc::new(directory);

    let state = Arc::new(AppState::new(&config, directory.clone(), storage.clone()));
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        storage,
        directory,
    }
}
