pub mod api;
pub mod config;
pub mod core_state; // Shared engines and store
pub mod pipeline;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::CoreState;

/// Startup or serving failure that ends the process.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Startup(#[from] core_state::CoreError),
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

pub fn run() -> Result<(), RunError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        ollama = %config.ollama_host,
        base_model = %config.base_model,
        "Configuration loaded"
    );

    // The model lifecycle uses a blocking HTTP client, so the engine is
    // built before the runtime exists and dropped after it is gone.
    let core = Arc::new(CoreState::from_config(&config)?);
    let model = core.engine().model();
    tracing::info!(model = %model.name, origin = ?model.origin, "Summarization engine ready");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let served = runtime.block_on(api::serve(
        core.clone(),
        config.bind_addr,
        &config.cors_origins,
        api::server::ctrl_c(),
    ));
    drop(runtime);
    drop(core);

    served.map_err(RunError::from)
}
