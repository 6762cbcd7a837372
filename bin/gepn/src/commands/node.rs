//! Node command - run the API server.
//!
//! Startup order: credential store, authentication service, super-admin
//! bootstrap, revocation sweeper, HTTP server. Runs until ctrl-c.

use std::{sync::Arc, time::Duration};

use eyre::{Result, WrapErr};
use gepn_auth::{AuthService, BootstrapOutcome};
use gepn_node_core::{
    config::GepnConfig,
    constants::REVOCATION_SWEEP_INTERVAL_SECS,
    version,
};
use gepn_rpc_server::{AppState, HttpServer, RpcServer};
use gepn_storage::{TimeoutStore, open_store};
use tracing::{debug, info, warn};

pub(crate) async fn run(config: GepnConfig) -> Result<()> {
    for setting in config.insecure_defaults() {
        warn!(%setting, "using insecure development default; set it before deploying");
    }
    if config.auth.degraded_mode {
        warn!("DEGRADED MODE enabled: token snapshots authorize requests when the store is unavailable");
    }

    let store = open_store(&config.database.uri, &config.database.name)
        .await
        .wrap_err_with(|| format!("failed to open credential store {}", config.database.uri))?;
    let store = Arc::new(TimeoutStore::new(store, config.database.timeout()));

    let auth = AuthService::builder(store, config.auth.jwt_secret.as_bytes().to_vec())
        .config(config.auth.auth_config())
        .build()
        .wrap_err("failed to build authentication service")?;
    let auth = Arc::new(auth);

    match auth
        .bootstrap_super_admin(&config.auth.admin_password)
        .await
        .wrap_err("failed to bootstrap super administrator")?
    {
        BootstrapOutcome::Created => info!(username = %config.auth.super_username, "created super administrator"),
        BootstrapOutcome::Reactivated => warn!(username = %config.auth.super_username, "restored super administrator"),
        BootstrapOutcome::Unchanged => debug!("super administrator present"),
    }

    let sweeper = tokio::spawn(sweep_revocations(auth.clone()));

    let server = HttpServer::with_config(config.http_server_config(), AppState::new(auth));
    info!(addr = %server.address(), agent = version::USER_AGENT, "GEPN API ready");

    let mut serve = {
        let server = server.clone();
        tokio::spawn(async move { server.start().await })
    };

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.wrap_err("failed to listen for shutdown signal")?;
            info!("Shutdown requested");
        }
        result = &mut serve => {
            sweeper.abort();
            warn!("HTTP server exited");
            return result.wrap_err("HTTP server task failed")?;
        }
    }

    server.stop().await?;
    serve.await.wrap_err("HTTP server task failed")??;
    sweeper.abort();
    Ok(())
}

async fn sweep_revocations(auth: Arc<AuthService>) {
    let mut interval = tokio::time::interval(Duration::from_secs(REVOCATION_SWEEP_INTERVAL_SECS));
    loop {
        interval.tick().await;
        auth.sweep_revocations();
    }
}
