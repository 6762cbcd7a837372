//! HTTP/JSON API server for GEPN.
//!
//! Exposes the login flows, session introspection, administrator management
//! and HR officer registration of [`gepn_auth::AuthService`] over axum.
//!
//! # Usage
//!
//! ```ignore
//! use gepn_rpc_server::{AppState, HttpServer, HttpServerConfig, RpcServer};
//!
//! let state = AppState::new(auth);
//! let server = HttpServer::with_config(HttpServerConfig::default(), state);
//! server.start().await?;
//! ```

mod error;
mod extract;
mod health;
mod routes;

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use gepn_auth::AuthService;
use tokio::{net::TcpListener, sync::watch};
use tracing::{info, warn};

pub use error::ApiError;
pub use extract::{Authenticated, AuthenticatedAdmin, JsonBody};
pub use health::{HealthService, SERVICE_NAME, ServingStatus};
pub use routes::router;

/// Default port of the HTTP server.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// A server that can be started and stopped from the node.
#[async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait RpcServer: Send + Sync {
    /// Serves until [`RpcServer::stop`] is called.
    async fn start(&self) -> eyre::Result<()>;

    async fn stop(&self) -> eyre::Result<()>;

    fn address(&self) -> SocketAddr;

    fn is_running(&self) -> bool;
}

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub health: HealthService,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>) -> Self {
        Self {
            auth,
            health: HealthService::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HttpServerConfig {
    /// Address to bind to.
    pub addr: SocketAddr,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_HTTP_PORT)),
        }
    }
}

/// HTTP server for the GEPN API.
pub struct HttpServer {
    config: HttpServerConfig,
    state: AppState,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    running: AtomicBool,
}

impl HttpServer {
    pub fn new(addr: SocketAddr, state: AppState) -> Arc<Self> {
        Self::with_config(HttpServerConfig { addr }, state)
    }

    pub fn with_config(config: HttpServerConfig, state: AppState) -> Arc<Self> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Arc::new(Self {
            config,
            state,
            shutdown_tx,
            shutdown_rx,
            running: AtomicBool::new(false),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RpcServer for HttpServer {
    async fn start(&self) -> eyre::Result<()> {
        let listener = TcpListener::bind(self.config.addr).await?;
        let app = router(self.state.clone());

        info!(target: "gepn::rpc", addr = %self.config.addr, "Starting HTTP server");
        self.running.store(true, Ordering::SeqCst);
        self.state.health.set_serving();

        let mut shutdown_rx = self.shutdown_rx.clone();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.changed().await.ok();
            })
            .await;

        self.running.store(false, Ordering::SeqCst);

        match result {
            Ok(()) => {
                info!(target: "gepn::rpc", "HTTP server stopped");
                Ok(())
            }
            Err(e) => {
                warn!(target: "gepn::rpc", error = %e, "HTTP server error");
                Err(e.into())
            }
        }
    }

    async fn stop(&self) -> eyre::Result<()> {
        info!(target: "gepn::rpc", "Stopping HTTP server");
        self.state.health.set_not_serving();
        self.shutdown_tx.send(true)?;
        Ok(())
    }

    fn address(&self) -> SocketAddr {
        self.config.addr
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
