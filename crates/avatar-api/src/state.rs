//! Application state shared by every handler.

use std::sync::Arc;

use avatar_core::Config;
use avatar_directory::IdentityVerifier;
use avatar_processing::IngestionPipeline;
use avatar_storage::AssetStore;

pub struct AppState {
    pub pipeline: IngestionPipeline,
    pub environment: String,
    /// Non-sensitive error details go into response bodies outside production.
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(
        config: &Config,
        verifier: Arc<dyn IdentityVerifier>,
        storage: Arc<dyn AssetStore>,
    ) -> Self {
        Self {
            pipeline: IngestionPipeline::new(verifier, storage, config.max_upload_size_bytes()),
            environment: config.environment().to_string(),
            expose_error_details: !config.is_production(),
        }
    }
}
