use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mineboard_client::StoreError;
use mineboard_shared::{
    ApiErrorBody, Category, NewTask, ServerInfo, Task, TaskId, ToggleAssignmentArgs,
};
use serde_json::json;
use tracing::{instrument, warn};

use crate::state::AppState;

pub type SharedState = Arc<AppState>;

pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/server", get(server_info))
        .route("/api/categories", get(categories_list))
        .route("/api/tasks", get(tasks_list).post(task_create))
        .route("/api/tasks/:id/completion", post(task_toggle_completion))
        .route("/api/tasks/:id/players", post(task_toggle_assignment))
        .with_state(state)
}

/// Wraps a [`StoreError`] so handlers can return it with `?`.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            StoreError::Unavailable(_) | StoreError::Decode(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            warn!(error = %self.0, "request failed");
        }
        let body = ApiErrorBody {
            error: match self.0 {
                StoreError::Rejected { message, .. } => message,
                other => other.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn server_info(State(state): State<SharedState>) -> Json<ServerInfo> {
    Json(state.info().clone())
}

#[instrument(skip(state))]
async fn categories_list(State(state): State<SharedState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.categories()?))
}

#[instrument(skip(state))]
async fn tasks_list(State(state): State<SharedState>) -> Result<Json<Vec<Task>>, ApiError> {
    Ok(Json(state.tasks()?))
}

#[instrument(skip(state, new_task), fields(title_len = new_task.title.len()))]
async fn task_create(
    State(state): State<SharedState>,
    Json(new_task): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.create(new_task)?;
    Ok((StatusCode::CREATED, Json(task)))
}

#[instrument(skip(state))]
async fn task_toggle_completion(
    State(state): State<SharedState>,
    Path(id): Path<TaskId>,
) -> Result<StatusCode, ApiError> {
    state.toggle_completion(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, args), fields(nickname = %args.nickname))]
async fn task_toggle_assignment(
    State(state): State<SharedState>,
    Path(id): Path<TaskId>,
    Json(args): Json<ToggleAssignmentArgs>,
) -> Result<StatusCode, ApiError> {
    state.toggle_assignment(&args.nickname, id)?;
    Ok(StatusCode::NO_CONTENT)
}
