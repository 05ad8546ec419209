use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::watch;
use crate::registry_manager::RegistryHandle;
use shared::protocol::API_PREFIX;
use shared::types::Service;

#[derive(Clone)]
pub struct AppState {
    pub registry: RegistryHandle,
    pub hash_rx: watch::Receiver<String>,
    pub agent: Arc<AgentInfo>,
}

/// Agent settings reported by `/v1/config`
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub hostname: String,
    pub default_ip: String,
    pub lifespan_secs: u64,
}

/// Published port for a service port; -1 when none matches
#[derive(Debug, Serialize)]
pub struct PortResponse {
    pub port: i32,
}

pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/config", get(get_config))
        .route("/services", get(get_services))
        .route("/services/hash", get(get_hash))
        .route("/services/:id", get(get_service))
        .route("/services/:id/ports/:port_type/:service_port", get(get_port));

    Router::new()
        .nest(API_PREFIX, v1)
        .with_state(state)
}

async fn get_config(State(state): State<AppState>) -> Json<AgentInfo> {
    Json(state.agent.as_ref().clone())
}

async fn get_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, StatusCode> {
    state
        .registry
        .get_all()
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Failed to query services: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn get_hash(State(state): State<AppState>) -> String {
    state.hash_rx.borrow().clone()
}

async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Service>, StatusCode> {
    state
        .registry
        .get_one(id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to query service: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_port(
    State(state): State<AppState>,
    Path((id, port_type, service_port)): Path<(String, String, String)>,
) -> Result<(StatusCode, Json<PortResponse>), StatusCode> {
    // No service declares a port outside u16, so anything else simply has no match
    let Ok(service_port) = service_port.parse::<u16>() else {
        return Ok((StatusCode::NOT_FOUND, Json(PortResponse { port: -1 })));
    };

    let lookup = state
        .registry
        .port_for(id, service_port, port_type)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve port: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match lookup {
        None => Err(StatusCode::NOT_FOUND),
        Some(Some(port)) => Ok((StatusCode::OK, Json(PortResponse { port: i32::from(port) }))),
        Some(None) => Ok((StatusCode::NOT_FOUND, Json(PortResponse { port: -1 }))),
    }
}
