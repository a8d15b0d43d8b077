//! Storage setup and initialization

use anyhow::Result;
use avatar_core::Config;
use avatar_storage::{create_storage, AssetStore};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn AssetStore>> {
    tracing::info!("Initializing avatar storage...");
    let storage = create_storage(config).await?;
    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %config.s3_bucket(),
        public_read = config.s3_public_read(),
        "Avatar storage initialized successfully"
    );
    Ok(storage)
}
