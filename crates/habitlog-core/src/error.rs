//! Error taxonomy for the submission engine.

use thiserror::Error;
use uuid::Uuid;

use crate::{habit::Habit, submission::YearMonth};

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown habit: {0:?}")]
  UnknownHabit(String),

  #[error("unknown field {field:?} for habit {habit}")]
  UnknownField { habit: Habit, field: String },

  #[error("invalid value for field {field:?}: {message}")]
  InvalidValue { field: String, message: String },

  /// The submission is approved; approved records are immutable.
  #[error("submission {0} is approved and can no longer be edited")]
  SubmissionLocked(Uuid),

  #[error("submission not found: {0}")]
  SubmissionNotFound(Uuid),

  #[error("submission {0} already carries a photo")]
  PhotoAlreadySet(Uuid),

  #[error("photo quota reached for {habit} in {month} (cap {cap})")]
  PhotoQuotaExceeded {
    habit: Habit,
    month: YearMonth,
    cap:   u32,
  },

  #[error("a rejection requires a non-empty reason")]
  RejectionReasonRequired,

  #[error("cannot {action} a submission that is {status}")]
  InvalidTransition {
    action: &'static str,
    status: &'static str,
  },

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
