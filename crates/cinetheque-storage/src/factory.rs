use crate::{LocalStorage, Storage, StorageResult};
use cinetheque_core::Config;
use std::sync::Arc;

/// Create the public disk from configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.storage_path(), config.public_base_url()).await?;

    tracing::info!(
        path = %config.storage_path(),
        base_url = %config.public_base_url(),
        "Local storage initialized"
    );

    Ok(Arc::new(storage))
}
