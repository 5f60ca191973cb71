//! Public disk setup

use anyhow::{Context, Result};
use cinetheque_core::Config;
use cinetheque_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    create_storage(config)
        .await
        .context("Failed to initialize storage")
}
