//! One error type for every handler, rendered as `{ "code", "message" }`.

use crate::intake::IntakeError;
use crate::inventory_actor::InventoryError;
use crate::item_actor::ItemError;
use crate::menu::MenuError;
use crate::order_actor::OrderError;
use crate::routing::RoutingError;
use crate::scheduler::ScheduleError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
            },
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    /// The detail goes to the log; callers only ever see a generic message.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "Internal error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<IntakeError> for ApiError {
    fn from(e: IntakeError) -> Self {
        let status = match &e {
            IntakeError::InvalidItem(_) | IntakeError::InvalidRequest(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            IntakeError::CapacityExhausted => StatusCode::SERVICE_UNAVAILABLE,
            IntakeError::InsufficientInventory(_) => StatusCode::CONFLICT,
            IntakeError::Internal(detail) => return ApiError::internal(detail),
        };
        Self::new(status, e.code(), e.to_string())
    }
}

impl From<ItemError> for ApiError {
    fn from(e: ItemError) -> Self {
        match e {
            ItemError::NotFound(_) => ApiError::not_found(e.to_string()),
            ItemError::WrongStation { .. }
            | ItemError::NotPending { .. }
            | ItemError::AlreadyCompleted(_)
            | ItemError::Unroutable(_)
            | ItemError::HasStations(_) => ApiError::conflict(e.to_string()),
            ItemError::Board(_) | ItemError::ActorCommunicationError(_) => ApiError::internal(e),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NotFound(_) => ApiError::not_found(e.to_string()),
            OrderError::AlreadyExists(_) => ApiError::conflict(e.to_string()),
            OrderError::InvalidRecord(_) | OrderError::ActorCommunicationError(_) => {
                ApiError::internal(e)
            }
        }
    }
}

impl From<RoutingError> for ApiError {
    fn from(e: RoutingError) -> Self {
        match e {
            RoutingError::OrderNotFound(_) => ApiError::not_found(e.to_string()),
            RoutingError::NotVisible(_) => ApiError::conflict(e.to_string()),
            RoutingError::Item(e) => e.into(),
            RoutingError::Order(e) => e.into(),
            RoutingError::Board(e) => ApiError::internal(e),
        }
    }
}

impl From<ScheduleError> for ApiError {
    fn from(e: ScheduleError) -> Self {
        ApiError::internal(e)
    }
}

impl From<InventoryError> for ApiError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::UnknownBranch(_) => ApiError::not_found(e.to_string()),
            other => ApiError::internal(other),
        }
    }
}

impl From<MenuError> for ApiError {
    fn from(e: MenuError) -> Self {
        match e {
            MenuError::Parse(_) | MenuError::Invalid(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_request", e.to_string())
            }
            MenuError::Io(_) => ApiError::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intake_errors_keep_their_reason_code() {
        let err = ApiError::from(IntakeError::CapacityExhausted);
        assert_eq!(err.code(), "capacity_exhausted");
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = ApiError::from(IntakeError::InvalidItem("unknown product: Soup".into()));
        assert_eq!(err.code(), "invalid_item");
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = ApiError::from(IntakeError::Internal("channel closed".into()));
        assert_eq!(err.code(), "internal");
        assert_eq!(err.body.message, "Internal error");
    }

    #[test]
    fn operator_mistakes_are_conflicts() {
        let err = ApiError::from(RoutingError::Item(ItemError::WrongStation {
            key: "k".into(),
            current: Some("grill".into()),
            requested: "fryer".into(),
        }));
        assert_eq!(err.code(), "conflict");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
