use anyhow::Result;
use meter_lookup_service::{
    config::AppConfig,
    http::{self, AppState},
    metrics_server,
    observability,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    // Load configuration
    let cfg = AppConfig::load()?;

    // Start metrics server if configured
    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let state = AppState::from_config(&cfg.data);
    for (name, path) in cfg.data.house_paths() {
        tracing::info!(house = %name, path = %path.display(), "serving house data");
    }

    http::serve(&cfg.server.bind_addr, state).await
}
