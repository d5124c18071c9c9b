use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing::get, Json, Router};

use crate::application::todo_item_service::TodoItemService;
use crate::domain::error::Availability;
use crate::domain::todo_item::{TodoItem, TodoItemId};
use crate::http::types::{ApiError, ListParams};

pub const BASE_PATH: &str = "/api/TodoItems";

#[derive(Clone)]
pub struct AppState<S: TodoItemService> { pub service: S }

pub fn router<S: TodoItemService + Clone>(state: AppState<S>) -> Router {
    Router::new()
        .route(BASE_PATH, get(list_todo_items::<S>).post(add_todo_item::<S>))
        .route(
            "/api/TodoItems/:id",
            get(get_todo_item::<S>).put(update_todo_item::<S>).delete(delete_todo_item::<S>),
        )
        .with_state(state)
}

async fn list_todo_items<S: TodoItemService>(
    State(state): State<AppState<S>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TodoItem>>, ApiError> {
    let query = params.into_query()?;
    match state.service.list(query).await? {
        Availability::Available(items) => Ok(Json(items)),
        Availability::Unavailable => Err(ApiError::not_found()),
    }
}

async fn get_todo_item<S: TodoItemService>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<Json<TodoItem>, ApiError> {
    match state.service.get_by_id(TodoItemId(id)).await? {
        Availability::Available(Some(item)) => Ok(Json(item)),
        _ => Err(ApiError::not_found()),
    }
}

async fn update_todo_item<S: TodoItemService>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
    Json(item): Json<TodoItem>,
) -> Result<StatusCode, ApiError> {
    if item.id != TodoItemId(id) {
        return Err(ApiError::bad_request("path id does not match todoItemId"));
    }
    let affected = state.service.update(TodoItemId(id), item).await?;
    if affected > 0 { Ok(StatusCode::NO_CONTENT) } else { Err(ApiError::not_found()) }
}

async fn add_todo_item<S: TodoItemService>(
    State(state): State<AppState<S>>,
    Json(mut item): Json<TodoItem>,
) -> Result<Response, ApiError> {
    let affected = state.service.add(&mut item).await?;
    if affected == 0 {
        return Err(ApiError::not_found());
    }
    let location = format!("{BASE_PATH}/{}", item.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(item)).into_response())
}

async fn delete_todo_item<S: TodoItemService>(
    State(state): State<AppState<S>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let affected = state.service.delete(TodoItemId(id)).await?;
    if affected > 0 { Ok(StatusCode::NO_CONTENT) } else { Err(ApiError::not_found()) }
}
