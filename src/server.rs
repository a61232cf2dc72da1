//! HTTP server bootstrap for the FakePay gateway.
//!
//! This module wires together:
//! - configuration
//! - the installation registry
//! - core services (session manager, callback dispatcher)
//! - the Axum router and the background session sweeper

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

use crate::infra::{CallbackDispatcher, InstallationRegistry, SessionManager};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server listen address.
    pub listen_addr: SocketAddr,
    /// Path to the installations YAML file.
    pub installations_path: PathBuf,
    /// How often the session sweeper prunes expired entries.
    pub sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(4567);

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let listen_addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .expect("Invalid listen address");

        let installations_path = std::env::var("INSTALLATIONS_PATH")
            .unwrap_or_else(|_| "conf/installations.yaml".to_string())
            .into();

        let sweep_secs: u64 = std::env::var("SESSION_SWEEP_SECS")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(60);

        Self {
            listen_addr,
            installations_path,
            sweep_interval: Duration::from_secs(sweep_secs),
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<InstallationRegistry>,
    pub sessions: Arc<SessionManager>,
    pub dispatcher: Arc<CallbackDispatcher>,
}

impl AppState {
    /// Assemble the service graph around a loaded registry.
    pub fn new(registry: Arc<InstallationRegistry>) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(registry.clone())),
            dispatcher: Arc::new(CallbackDispatcher::new()),
            registry,
        }
    }
}

/// Start the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting FakePay v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    info!("Configuration loaded");
    info!("  Listen address: {}", config.listen_addr);
    info!("  Installations file: {}", config.installations_path.display());

    let registry = Arc::new(InstallationRegistry::load(&config.installations_path)?);
    info!("Loaded {} installations", registry.len());

    let state = AppState::new(registry);
    spawn_session_sweeper(state.sessions.clone(), config.sweep_interval);

    let app = build_router().with_state(state);

    info!("Starting HTTP server on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;

    info!("FakePay is ready to accept payment requests");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();
}

/// Build the full router with request tracing.
pub fn build_router() -> Router<AppState> {
    crate::api::router().layer(TraceLayer::new_for_http())
}

/// Periodically evict expired sessions so abandoned payments do not
/// accumulate between requests. Visibility never depends on this; reads
/// enforce expiry on their own.
fn spawn_session_sweeper(sessions: Arc<SessionManager>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await; // the first tick fires immediately
        loop {
            ticker.tick().await;
            let removed = sessions.prune().await;
            if removed > 0 {
                debug!(removed, "pruned expired payment sessions");
            }
        }
    });
}
