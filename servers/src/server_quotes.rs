use anyhow::{Context, Result};
use lib_quotes::loggers::loggerlocal::{level_from_name, LoggerLocal, LoggerLocalOptions, ALL_LEVELS};
use std::sync::Arc;
use tokio::signal;

mod quotes_logic;
use quotes_logic::{config, logger, routes, state};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config();
    logger::setup_logging(&config.log_dir(), &config.log_level())?;
    log::info!("Effective configuration: {}", serde_json::to_string(&config)?);

    let provider_options = LoggerLocalOptions {
        use_tty: Some(ALL_LEVELS.to_vec()),
        use_file: Some(ALL_LEVELS.to_vec()),
        log_dir: Some(config.log_dir()),
    }
    .with_min_level(level_from_name(&config.log_level()));
    let provider_logger = Arc::new(LoggerLocal::new("quotes_providers".to_string(), Some(provider_options)));

    let app_state = state::AppState::from_config(&config, provider_logger);
    let app = routes::build_router(app_state, &config.cors());

    let addr = format!("{}:{}", config.host(), config.port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("Quotes server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Ctrl-C received, initiating shutdown.");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term_signal) => {
                term_signal.recv().await;
                log::info!("SIGTERM received, initiating shutdown.");
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
