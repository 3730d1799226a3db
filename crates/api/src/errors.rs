//! Maps `noetic_common::Error` onto an HTTP status + `ErrorResponse` body.

use crate::types::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub struct ApiError(pub noetic_common::Error);

impl From<noetic_common::Error> for ApiError {
    fn from(e: noetic_common::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}
