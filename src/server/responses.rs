//! Response envelopes shared across route handlers.

use crate::error::{LibraryError, LibraryResult};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
pub struct Message {
    pub message: String,
}

#[derive(Serialize)]
struct ErrorDetail {
    message: String,
}

/// Error payload shape: `{"detail": {"message": "..."}}`.
#[derive(Serialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

pub fn error_response(err: &LibraryError) -> Response {
    let status = match err {
        LibraryError::NotFound(_) => StatusCode::NOT_FOUND,
        LibraryError::Duplicate(_) => StatusCode::CONFLICT,
        LibraryError::Constraint(_) => StatusCode::PRECONDITION_FAILED,
        LibraryError::Path(_) | LibraryError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("{}", err);
    } else {
        warn!("{}", err);
    }
    let body = ErrorBody {
        detail: ErrorDetail {
            message: err.to_string(),
        },
    };
    (status, Json(body)).into_response()
}

pub fn json_or_error<T: Serialize>(result: LibraryResult<T>) -> Response {
    match result {
        Ok(value) => Json(value).into_response(),
        Err(err) => error_response(&err),
    }
}

pub fn message_response(message: String) -> Response {
    Json(Message { message }).into_response()
}
