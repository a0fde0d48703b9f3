//! Error type for `habitlog-store-sqlite`.
//!
//! Domain failures (locked submission, quota, validation) travel as
//! [`habitlog_core::Error`] untouched; this type covers what the backend
//! itself can get wrong, and folds into the core taxonomy as `Storage`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored row no longer decodes (bad status, date, or habit tag).
  #[error("malformed row: {0}")]
  Decode(String),
}

impl From<Error> for habitlog_core::Error {
  fn from(e: Error) -> Self {
    Self::Storage(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
