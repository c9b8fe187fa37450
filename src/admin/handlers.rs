use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::balancer::pool::PoolError;
use crate::balancer::StrategyKind;
use crate::http::server::AppState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub strategy: &'static str,
    pub backend_count: usize,
}

#[derive(Serialize)]
pub struct BackendStatus {
    pub address: String,
    pub weight: u32,
    pub alive: bool,
    pub active_connections: usize,
}

#[derive(Deserialize)]
pub struct AddBackendRequest {
    pub address: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct RemoveBackendRequest {
    pub address: String,
}

#[derive(Deserialize)]
pub struct SetStrategyRequest {
    pub strategy: String,
}

#[derive(Serialize)]
pub struct StrategyStatus {
    pub strategy: &'static str,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_body(message: impl Into<String>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: message.into(),
    })
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        strategy: state.pool.strategy_kind().as_str(),
        backend_count: state.pool.backend_count(),
    })
}

pub async fn list_backends(State(state): State<AppState>) -> Json<Vec<BackendStatus>> {
    let statuses = state
        .pool
        .backends()
        .iter()
        .map(|b| BackendStatus {
            address: b.url().to_string(),
            weight: b.weight(),
            alive: b.is_alive(),
            active_connections: b.connections(),
        })
        .collect();
    Json(statuses)
}

pub async fn add_backend(
    State(state): State<AppState>,
    Json(body): Json<AddBackendRequest>,
) -> Result<(StatusCode, Json<BackendStatus>), (StatusCode, Json<ErrorBody>)> {
    if body.weight == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            error_body("weight must be >= 1"),
        ));
    }

    match state.pool.add_backend_addr(&body.address, body.weight) {
        Ok(backend) => Ok((
            StatusCode::CREATED,
            Json(BackendStatus {
                address: backend.url().to_string(),
                weight: backend.weight(),
                alive: backend.is_alive(),
                active_connections: backend.connections(),
            }),
        )),
        Err(e) => Err((StatusCode::BAD_REQUEST, error_body(e.to_string()))),
    }
}

pub async fn remove_backend(
    State(state): State<AppState>,
    Json(body): Json<RemoveBackendRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    match state.pool.remove_backend(&body.address) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e @ PoolError::BackendNotFound(_)) => {
            Err((StatusCode::NOT_FOUND, error_body(e.to_string())))
        }
        Err(e) => Err((StatusCode::BAD_REQUEST, error_body(e.to_string()))),
    }
}

pub async fn get_strategy(State(state): State<AppState>) -> Json<StrategyStatus> {
    Json(StrategyStatus {
        strategy: state.pool.strategy_kind().as_str(),
    })
}

pub async fn set_strategy(
    State(state): State<AppState>,
    Json(body): Json<SetStrategyRequest>,
) -> Result<Json<StrategyStatus>, (StatusCode, Json<ErrorBody>)> {
    let kind: StrategyKind = body
        .strategy
        .parse()
        .map_err(|e: crate::balancer::UnknownStrategy| {
            (StatusCode::BAD_REQUEST, error_body(e.to_string()))
        })?;

    state.pool.set_strategy(kind);
    Ok(Json(StrategyStatus {
        strategy: kind.as_str(),
    }))
}
