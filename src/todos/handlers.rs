use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{dto::MessageResponse, extractors::AuthUser},
    error::ApiError,
    state::AppState,
    todos::{dto::TodoRequest, repo_types::Todo},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos))
        .route("/todos/:id", get(get_todo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/todo", post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
}

#[instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TodoRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let todo = Todo::create(&state.db, user_id, &payload.title, &payload.description)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "create todo failed");
            ApiError::internal("Failed to create todo")
        })?;

    info!(user_id, todo_id = todo.id, "todo created");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Todo created successfully")),
    ))
}

#[instrument(skip(state))]
pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = Todo::list_by_user(&state.db, user_id).await.map_err(|e| {
        error!(error = %e, user_id, "list todos failed");
        ApiError::internal("Failed to fetch todos")
    })?;
    Ok(Json(todos))
}

#[instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, ApiError> {
    let todo = Todo::find_by_id(&state.db, user_id, id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, id, "get todo failed");
            ApiError::internal("Failed to fetch todo")
        })?
        .ok_or_else(|| ApiError::not_found("Todo not found"))?;
    Ok(Json(todo))
}

#[instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<TodoRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = Todo::update(&state.db, user_id, id, &payload.title, &payload.description)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, id, "update todo failed");
            ApiError::internal("Failed to update todo")
        })?;

    debug!(user_id, id, rows, "todo update executed");
    Ok(Json(MessageResponse::new("Todo updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows = Todo::delete(&state.db, user_id, id).await.map_err(|e| {
        error!(error = %e, user_id, id, "delete todo failed");
        ApiError::internal("Failed to delete todo")
    })?;

    debug!(user_id, id, rows, "todo delete executed");
    Ok(Json(MessageResponse::new("Todo deleted successfully")))
}
