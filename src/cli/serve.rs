//! Serve command implementation

use crate::api::{create_router, AppState};
use crate::cli::ServeArgs;
use crate::config::{LogFormat, SwitchyardConfig};
use crate::dispatch::Dispatcher;
use crate::provider::build_entries;
use crate::registry::ProviderRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Load configuration with CLI overrides
pub fn load_config_with_overrides(
    args: &ServeArgs,
) -> Result<SwitchyardConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        SwitchyardConfig::load(Some(args.config.as_path()))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        SwitchyardConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }
    if args.no_health_check {
        config.health_check.enabled = false;
    }

    Ok(config)
}

/// Initialize tracing based on configuration
pub fn init_tracing(
    config: &crate::config::LoggingConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter_str = crate::logging::build_filter_directives(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .try_init()?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .try_init()?;
        }
    }

    Ok(())
}

/// HTTP client shared by every provider.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .build()
}

/// Build the dispatcher and its registry from configuration
pub fn build_dispatcher(
    config: &SwitchyardConfig,
    client: Arc<reqwest::Client>,
) -> Result<Arc<Dispatcher>, Box<dyn std::error::Error>> {
    let entries = build_entries(&config.providers, client)?;
    for entry in &entries {
        tracing::info!(
            name = %entry.descriptor.name,
            url = %entry.descriptor.base_url,
            provider_type = %entry.descriptor.provider_type,
            priority = entry.descriptor.priority,
            models = entry.descriptor.models.len(),
            "Loaded provider from config"
        );
    }

    let registry = Arc::new(ProviderRegistry::new(entries)?);
    Ok(Arc::new(Dispatcher::new(registry, config)))
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }

    cancel_token.cancel();
}

/// Main serve command handler
pub async fn run_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args)?;
    config.validate()?;

    init_tracing(&config.logging)?;

    tracing::info!("Starting Switchyard");
    tracing::debug!(?config, "Loaded configuration");

    let client = Arc::new(build_http_client()?);
    let dispatcher = build_dispatcher(&config, Arc::clone(&client))?;
    if dispatcher.registry().is_empty() {
        tracing::warn!("No providers configured; every request will be rejected");
    }

    let cancel_token = CancellationToken::new();
    let health_handle = if config.health_check.enabled {
        tracing::info!(
            interval_secs = config.health_check.interval_seconds,
            "Starting health checker"
        );
        Some(Arc::clone(dispatcher.checker()).start(cancel_token.clone()))
    } else {
        tracing::info!("Health checking disabled");
        None
    };

    let mut state = AppState::new(Arc::clone(&dispatcher), Arc::new(config.clone()), client)
        .with_shutdown(cancel_token.clone());
    if args.config.exists() {
        state = state.with_config_path(args.config.clone());
    }
    let app = create_router(Arc::new(state));

    let addr = config.server.bind_addr();
    tracing::info!(addr = %addr, "Switchyard listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token.clone()))
        .await?;

    if let Some(handle) = health_handle {
        tracing::info!("Waiting for health checker to stop");
        handle.await?;
    }

    tracing::info!("Switchyard stopped");
    Ok(())
}
