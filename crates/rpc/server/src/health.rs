//! Health reporting.

use std::{collections::HashMap, sync::Arc};

use axum::{Json, extract::State, http::StatusCode};
use parking_lot::RwLock;
use serde::Serialize;

use crate::AppState;

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "gepn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

/// Tracks the serving status of the server and its components.
///
/// The empty component name holds the overall status.
#[derive(Debug, Clone)]
pub struct HealthService {
    statuses: Arc<RwLock<HashMap<String, ServingStatus>>>,
}

impl Default for HealthService {
    fn default() -> Self {
        let statuses = Arc::new(RwLock::new(HashMap::new()));
        statuses.write().insert(String::new(), ServingStatus::Serving);
        Self { statuses }
    }
}

impl HealthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, component: impl Into<String>, status: ServingStatus) {
        self.statuses.write().insert(component.into(), status);
    }

    pub fn status(&self, component: &str) -> Option<ServingStatus> {
        self.statuses.read().get(component).copied()
    }

    pub fn set_serving(&self) {
        self.set_status("", ServingStatus::Serving);
    }

    pub fn set_not_serving(&self) {
        self.set_status("", ServingStatus::NotServing);
    }

    /// True iff every component is serving.
    pub fn is_serving(&self) -> bool {
        self.statuses
            .read()
            .values()
            .all(|status| *status == ServingStatus::Serving)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    service: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = if state.health.is_serving() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, ServingStatus::NotServing.into())
    };
    (
        code,
        Json(HealthResponse {
            status,
            service: SERVICE_NAME,
        }),
    )
}
