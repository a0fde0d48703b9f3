//! JSON REST API for habitlog.
//!
//! Exposes an axum [`Router`] backed by any
//! [`habitlog_core::store::SubmissionStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility — the submit path trusts the
//! `student_id` it is given, and approve/reject trust the `approver_id`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", habitlog_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod habits;
pub mod submissions;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use habitlog_core::store::SubmissionStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SubmissionStore + 'static,
{
  Router::new()
    .route("/habits", get(habits::list))
    .route(
      "/submissions",
      get(submissions::list::<S>).post(submissions::submit::<S>),
    )
    .route("/submissions/{id}", get(submissions::get_one::<S>))
    .route("/submissions/{id}/approve", post(submissions::approve::<S>))
    .route("/submissions/{id}/reject", post(submissions::reject::<S>))
    .route("/photo-usage", get(submissions::photo_usage::<S>))
    .with_state(store)
}

// ─── Integration tests ───────────────────────────────────────────────────────
