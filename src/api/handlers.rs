//! Request handlers for the API endpoints.

use std::sync::{Arc, MutexGuard};

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use tracing::info;

use super::AppState;
use super::types::{
    ErrorResponse, MessageResponse, NameQuery, PlanRequest, PlanResponse, SaveRequest,
};
use crate::config::PlanConfig;
use crate::error::PlanError;
use crate::plan::SharingMode;
use crate::session::Planner;
use crate::store::{ConfigStore, StoreError};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn store_error(err: StoreError) -> ApiError {
    let status = match err {
        StoreError::MissingName | StoreError::InvalidName(_) => StatusCode::BAD_REQUEST,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Io(_) | StoreError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error(status, err.to_string())
}

fn lock_store(state: &AppState) -> Result<MutexGuard<'_, Box<dyn ConfigStore + Send>>, ApiError> {
    state
        .store
        .lock()
        .map_err(|_| error(StatusCode::INTERNAL_SERVER_ERROR, "configuration store unavailable"))
}

/// Runs `op` against the store on the blocking thread pool.
///
/// File-backed stores do synchronous filesystem I/O under the lock, which
/// must not stall the async workers.
async fn with_store<T, F>(state: Arc<AppState>, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut (dyn ConfigStore + Send)) -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut store = lock_store(&state)?;
        op(&mut **store).map_err(store_error)
    })
    .await
    .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, format!("store task failed: {e}")))?
}

/// `GET /api/list-configs` → 200 + sorted names
pub async fn list_configs(State(state): State<Arc<AppState>>) -> ApiResult<Vec<String>> {
    let names = with_store(state, |store| store.list()).await?;
    Ok(Json(names))
}

/// `GET /api/load-config?name=` → 200 + blob, 400 without a name, 404 if unknown
pub async fn load_config(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> ApiResult<serde_json::Value> {
    let name = query.name.unwrap_or_default();
    let data = with_store(state, move |store| store.load(&name)).await?;
    Ok(Json(data))
}

/// `POST /api/save-config` → 200, or 400 when name or data is missing
pub async fn save_config(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SaveRequest>,
) -> ApiResult<MessageResponse> {
    let (Some(name), Some(data)) = (body.name, body.data) else {
        return Err(error(StatusCode::BAD_REQUEST, "missing name or data"));
    };
    let name = name.trim().to_string();
    let key = name.clone();
    with_store(state, move |store| store.save(&key, data)).await?;
    info!(name = %name, "configuration saved via API");
    Ok(Json(MessageResponse {
        success: true,
        message: format!("configuration \"{name}\" saved"),
    }))
}

/// `DELETE /api/delete-config?name=` → 200 (also when absent), 400 without a name
pub async fn delete_config(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> ApiResult<MessageResponse> {
    let name = query.name.unwrap_or_default().trim().to_string();
    let key = name.clone();
    let removed = with_store(state, move |store| store.delete(&key)).await?;
    Ok(Json(MessageResponse {
        success: true,
        message: if removed {
            format!("configuration \"{name}\" deleted")
        } else {
            format!("configuration \"{name}\" did not exist")
        },
    }))
}

/// `POST /api/plan` → 200 + plan, 400 for an invalid configuration
pub async fn plan(Json(body): Json<PlanRequest>) -> ApiResult<PlanResponse> {
    let mut config = PlanConfig::from_json_value(body.config)
        .map_err(|e| error(StatusCode::BAD_REQUEST, e.to_string()))?;
    if let Some(target_mw) = body.target_mw {
        config.target_load_mw = target_mw;
    }
    if let Some(mode) = body.sharing_mode {
        config.networked_loadbanks = mode == SharingMode::Networked;
    }
    config.auto_distribute = true;

    let planner = Planner::from_config(&config).map_err(|e| match e {
        PlanError::Invalid(_) | PlanError::Config(_) => {
            error(StatusCode::BAD_REQUEST, e.to_string())
        }
        other => error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;

    Ok(Json(PlanResponse {
        sharing_mode: planner.settings().sharing_mode,
        assignment: planner.assignment().clone(),
        unassigned_kw: planner.unassigned_kw(),
        saturated_lineups: planner.saturated_lineups().to_vec(),
        warnings: planner.warnings(),
        advisories: planner.advisories(),
        summary: planner.summary(),
    }))
}
