use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::error::StoreError;
use crate::domain::todo_item::{parse_due_date, ListQuery, TodoItemFilter};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody { pub message: String }

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn not_found() -> Self {
        Self { status: StatusCode::NOT_FOUND, message: "Not found".into() }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => {
                Self { status: StatusCode::CONFLICT, message: err.to_string() }
            }
            StoreError::Fault(_) => {
                tracing::error!(error = %err, "store fault");
                Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: err.to_string() }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, axum::Json(ErrorBody { message: self.message })).into_response()
    }
}

/// Query string of `GET /api/TodoItems`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub name_filter: Option<String>,
    pub description_filter: Option<String>,
    pub due_date_filter: Option<String>,
    pub status_filter: Option<String>,
    pub sort_by: Option<String>,
    pub is_descending: Option<bool>,
}

impl ListParams {
    pub fn into_query(self) -> Result<ListQuery, ApiError> {
        let due_date = match self.due_date_filter.as_deref().filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_due_date(raw).ok_or_else(|| {
                ApiError::bad_request(format!("invalid dueDateFilter `{raw}`"))
            })?),
            None => None,
        };
        Ok(ListQuery {
            filter: TodoItemFilter {
                name: self.name_filter,
                description: self.description_filter,
                due_date,
                status: self.status_filter,
            },
            sort_by: self.sort_by,
            is_descending: self.is_descending.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::domain::todo_item::TodoItemId;

    async fn rendered(err: StoreError) -> (StatusCode, serde_json::Value) {
        let res = ApiError::from(err).into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn conflict_maps_to_409_with_message() {
        let (status, body) = rendered(StoreError::Conflict(TodoItemId(7))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, serde_json::json!({ "message": "todo item 7 was modified concurrently" }));
    }

    #[tokio::test]
    async fn fault_maps_to_500_with_message() {
        let (status, body) = rendered(StoreError::fault(std::io::Error::other("disk gone"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "message": "store fault: disk gone" }));
    }

    #[test]
    fn list_params_default_to_ascending_without_filters() {
        let query = ListParams::default().into_query().unwrap();
        assert!(!query.is_descending);
        assert_eq!(query.filter, TodoItemFilter::default());
    }

    #[test]
    fn list_params_accept_offset_due_date_filter() {
        let params = ListParams {
            due_date_filter: Some("2099-11-06T00:00:00Z".into()),
            ..Default::default()
        };
        assert_eq!(params.into_query().unwrap().filter.due_day(), Some(6));
    }
}
