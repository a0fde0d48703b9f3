//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, dates `YYYY-MM-DD`, times `HH:MM:SS`,
//! UUIDs hyphenated lowercase. Approval state is flattened into the four
//! status columns of the ledger row.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use habitlog_core::{
  approval::Approval,
  habit::Habit,
  submission::{PhotoRef, Submission, YearMonth},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── Timestamps, dates, times ────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn encode_time(t: NaiveTime) -> String {
  t.format("%H:%M:%S").to_string()
}

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .map_err(|e| Error::Decode(format!("time {s:?}: {e}")))
}

// ─── Habit ───────────────────────────────────────────────────────────────────

pub fn encode_habit(h: Habit) -> &'static str {
  h.as_str()
}

pub fn decode_habit(s: &str) -> Result<Habit> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown habit {s:?}")))
}

/// The detail partition table for a habit category.
pub fn detail_table(h: Habit) -> &'static str {
  match h {
    Habit::WakeUp => "wake_up_details",
    Habit::Exercise => "exercise_details",
    Habit::Worship => "worship_details",
    Habit::Study => "study_details",
    Habit::Nutrition => "nutrition_details",
    Habit::Community => "community_details",
    Habit::SleepEarly => "sleep_early_details",
  }
}

// ─── Month range ─────────────────────────────────────────────────────────────

/// Half-open ISO date bounds `[start, end)` covering one calendar month.
/// ISO dates compare lexicographically, so these work directly in SQL.
pub fn month_bounds(month: YearMonth) -> (String, String) {
  (format!("{month}-01"), format!("{}-01", month.next()))
}

// ─── Approval columns ────────────────────────────────────────────────────────

/// Flatten approval state into the ledger's status columns:
/// `(status, approver_id, decided_at, rejection_reason)`.
pub fn approval_columns(
  a: &Approval,
) -> (&'static str, Option<String>, Option<String>, Option<String>) {
  match a {
    Approval::Pending => (a.status_str(), None, None, None),
    Approval::Approved {
      approver_id,
      decided_at,
    } => (
      a.status_str(),
      Some(encode_uuid(*approver_id)),
      Some(encode_dt(*decided_at)),
      None,
    ),
    Approval::Rejected {
      approver_id,
      reason,
      decided_at,
    } => (
      a.status_str(),
      Some(encode_uuid(*approver_id)),
      Some(encode_dt(*decided_at)),
      Some(reason.clone()),
    ),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `submissions` row.
pub struct RawSubmission {
  pub submission_id:    String,
  pub student_id:       String,
  pub habit:            String,
  pub date:             String,
  pub primary_time:     Option<String>,
  pub photo:            Option<String>,
  pub note:             Option<String>,
  pub status:           String,
  pub approver_id:      Option<String>,
  pub decided_at:       Option<String>,
  pub rejection_reason: Option<String>,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<Submission> {
    let approval = match self.status.as_str() {
      "pending" => Approval::Pending,
      "approved" => Approval::Approved {
        approver_id: decode_uuid(&required(
          self.approver_id.as_deref(),
          "approver_id",
        )?)?,
        decided_at:  decode_dt(&required(
          self.decided_at.as_deref(),
          "decided_at",
        )?)?,
      },
      "rejected" => Approval::Rejected {
        approver_id: decode_uuid(&required(
          self.approver_id.as_deref(),
          "approver_id",
        )?)?,
        reason:      required(self.rejection_reason.as_deref(), "rejection_reason")?,
        decided_at:  decode_dt(&required(
          self.decided_at.as_deref(),
          "decided_at",
        )?)?,
      },
      other => {
        return Err(Error::Decode(format!("unknown status {other:?}")));
      }
    };

    Ok(Submission {
      submission_id: decode_uuid(&self.submission_id)?,
      student_id: decode_uuid(&self.student_id)?,
      habit: decode_habit(&self.habit)?,
      date: decode_date(&self.date)?,
      primary_time: self.primary_time.as_deref().map(decode_time).transpose()?,
      photo: self.photo.map(PhotoRef),
      note: self.note,
      approval,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

fn required(value: Option<&str>, column: &str) -> Result<String> {
  value
    .map(str::to_string)
    .ok_or_else(|| Error::Decode(format!("missing {column} for decided row")))
}
