//! The `SubmissionStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `habitlog-store-sqlite`). Higher layers depend on this abstraction, not
//! on any concrete backend. Methods return the core error type so
//! transport layers can map the taxonomy without downcasting.

use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Result,
  habit::Habit,
  submission::{SubmissionPatch, SubmissionView, YearMonth},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`SubmissionStore::list_submissions`].
#[derive(Debug, Clone)]
pub struct SubmissionQuery {
  pub student_id: Uuid,
  /// Restrict to one habit category.
  pub habit:      Option<Habit>,
  /// Restrict to one calendar month.
  pub month:      Option<YearMonth>,
}

/// Monthly photo-evidence usage for one (student, habit) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhotoUsage {
  pub used: u32,
  pub cap:  u32,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a habitlog storage backend.
///
/// Every write operation is atomic per call: the ledger row, its detail
/// row, and the photo-quota check commit or roll back together. Calls for
/// the same (student, habit, date) serialize; a lost update between two
/// auto-saves is a backend bug.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  /// Apply one partial update to the (student, habit, date) record,
  /// creating it if this is the day's first write. Returns the reconciled
  /// labeled view.
  fn submit(
    &self,
    patch: SubmissionPatch,
  ) -> impl Future<Output = Result<SubmissionView>> + Send + '_;

  /// pending|rejected → approved. Locks the submission against edits.
  fn approve(
    &self,
    submission_id: Uuid,
    approver_id: Uuid,
  ) -> impl Future<Output = Result<SubmissionView>> + Send + '_;

  /// pending|approved → rejected. The reason is mandatory; the record
  /// becomes editable again.
  fn reject(
    &self,
    submission_id: Uuid,
    approver_id: Uuid,
    reason: String,
  ) -> impl Future<Output = Result<SubmissionView>> + Send + '_;

  /// Fetch one submission's view. Returns `None` if not found.
  fn get_submission(
    &self,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<Option<SubmissionView>>> + Send + '_;

  /// All of a student's submissions matching `query`, ordered by date
  /// then habit.
  fn list_submissions<'a>(
    &'a self,
    query: &'a SubmissionQuery,
  ) -> impl Future<Output = Result<Vec<SubmissionView>>> + Send + 'a;

  /// How many photo-bearing submissions the student already has for this
  /// habit and month, against the configured cap.
  fn photo_usage(
    &self,
    student_id: Uuid,
    habit: Habit,
    month: YearMonth,
  ) -> impl Future<Output = Result<PhotoUsage>> + Send + '_;
}
