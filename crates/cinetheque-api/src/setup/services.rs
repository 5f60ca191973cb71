//! Application state wiring

use cinetheque_core::Config;
use cinetheque_db::PgCatalog;
use cinetheque_storage::Storage;
use sqlx::PgPool;
use std::sync::Arc;

use crate::state::AppState;

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Arc<AppState> {
    let catalog = Arc::new(PgCatalog::new(pool));
    tracing::info!(
        default_per_page = config.default_per_page(),
        "Catalog repositories initialized"
    );
    Arc::new(AppState::new(catalog, storage, config.default_per_page()))
}
