use std::sync::Arc;

use tracing::info;

use crate::config::DetectorConfig;
use crate::services::results::ResultStore;

/// Prepare the directory processed results are written to and served from
pub async fn setup_results(config: &DetectorConfig) -> anyhow::Result<Arc<ResultStore>> {
    let store = ResultStore::new(config.output_dir.clone());
    store.prepare().await?;

    info!("🗂️  Result store ready at {}", config.output_dir.display());

    Ok(Arc::new(store))
}
