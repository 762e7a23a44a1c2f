use std::sync::Arc;

use tracing::info;

use crate::config::DetectorConfig;
use crate::engine::DetectionEngine;

/// Build the configured engine and check the model file is reachable
pub async fn setup_engine(config: &DetectorConfig) -> anyhow::Result<Arc<dyn DetectionEngine>> {
    let engine = crate::engine::create_engine(&config.engine_backend)?;

    // Warm-up check only; the model itself is loaded per request
    if tokio::fs::metadata(&config.model_path).await.is_ok() {
        info!(
            "🧠 Detection engine '{}' ready (model: {})",
            engine.name(),
            config.model_path.display()
        );
    } else {
        tracing::warn!(
            "⚠️  Model file {} not found! Detection requests will fail until it exists.",
            config.model_path.display()
        );
    }

    Ok(engine.into())
}
