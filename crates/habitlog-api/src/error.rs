//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! The domain taxonomy maps onto HTTP statuses here and nowhere else;
//! handlers just bubble core errors up with `?`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use habitlog_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CoreError);

fn status_for(e: &CoreError) -> StatusCode {
  match e {
    CoreError::UnknownHabit(_)
    | CoreError::UnknownField { .. }
    | CoreError::InvalidValue { .. }
    | CoreError::RejectionReasonRequired => StatusCode::UNPROCESSABLE_ENTITY,
    CoreError::SubmissionNotFound(_) => StatusCode::NOT_FOUND,
    CoreError::SubmissionLocked(_)
    | CoreError::PhotoAlreadySet(_)
    | CoreError::PhotoQuotaExceeded { .. }
    | CoreError::InvalidTransition { .. } => StatusCode::CONFLICT,
    CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

fn code_for(e: &CoreError) -> &'static str {
  match e {
    CoreError::UnknownHabit(_) => "unknown_habit",
    CoreError::UnknownField { .. } => "unknown_field",
    CoreError::InvalidValue { .. } => "invalid_value",
    CoreError::SubmissionLocked(_) => "submission_locked",
    CoreError::SubmissionNotFound(_) => "submission_not_found",
    CoreError::PhotoAlreadySet(_) => "photo_already_set",
    CoreError::PhotoQuotaExceeded { .. } => "photo_quota_exceeded",
    CoreError::RejectionReasonRequired => "rejection_reason_required",
    CoreError::InvalidTransition { .. } => "invalid_transition",
    CoreError::Storage(_) => "storage",
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = status_for(&self.0);
    if status.is_server_error() {
      tracing::error!(error = %self.0, "request failed");
    }
    let body = json!({
      "error":   code_for(&self.0),
      "message": self.0.to_string(),
    });
    (status, Json(body)).into_response()
  }
}
