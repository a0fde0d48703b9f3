//! Submission — the single daily ledger record for one student and habit.
//!
//! A submission holds the shared fields (date, primary time, photo, note,
//! approval state); the habit-specific fields live in its 1:1
//! [`HabitDetail`](crate::detail::HabitDetail). The labeled read model is
//! assembled on demand, never stored.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  approval::Approval,
  detail::HabitDetail,
  error::{Error, Result},
  habit::Habit,
  schema::{FieldKind, FieldValue, schema_for},
};

// ─── Photo reference ─────────────────────────────────────────────────────────

/// Opaque reference to an uploaded evidence photo (a storage key or path).
/// The engine never reads the bytes; it tracks only presence and count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRef(pub String);

// ─── Calendar month ──────────────────────────────────────────────────────────

/// A calendar month, used for photo-quota scoping and list filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
  year:  i32,
  month: u32,
}

impl YearMonth {
  pub fn new(year: i32, month: u32) -> Option<Self> {
    (1..=12).contains(&month).then_some(Self { year, month })
  }

  pub fn of(date: NaiveDate) -> Self {
    Self {
      year:  date.year(),
      month: date.month(),
    }
  }

  pub fn year(&self) -> i32 {
    self.year
  }

  pub fn month(&self) -> u32 {
    self.month
  }

  /// The month immediately after this one.
  pub fn next(self) -> Self {
    if self.month == 12 {
      Self {
        year:  self.year + 1,
        month: 1,
      }
    } else {
      Self {
        year:  self.year,
        month: self.month + 1,
      }
    }
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    date.year() == self.year && date.month() == self.month
  }
}

impl fmt::Display for YearMonth {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:04}-{:02}", self.year, self.month)
  }
}

impl FromStr for YearMonth {
  type Err = Error;

  /// Parse `YYYY-MM`.
  fn from_str(s: &str) -> Result<Self> {
    let parsed = s.split_once('-').and_then(|(y, m)| {
      let year = y.parse().ok()?;
      let month = m.parse().ok()?;
      Self::new(year, month)
    });
    parsed.ok_or_else(|| Error::InvalidValue {
      field:   "month".to_string(),
      message: format!("expected YYYY-MM, got {s:?}"),
    })
  }
}

// ─── Submission ──────────────────────────────────────────────────────────────

/// One ledger row. At most one exists per (student, habit, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
  pub submission_id: Uuid,
  pub student_id:    Uuid,
  pub habit:         Habit,
  pub date:          NaiveDate,
  /// The habit's primary time-of-day slot (wake time, exercise time,
  /// sleep time), when the habit has one.
  pub primary_time:  Option<NaiveTime>,
  pub photo:         Option<PhotoRef>,
  pub note:          Option<String>,
  pub approval:      Approval,
  pub created_at:    DateTime<Utc>,
  pub updated_at:    DateTime<Utc>,
}

// ─── Patch ───────────────────────────────────────────────────────────────────

/// One partial update from the client — a single auto-save.
/// `fields` carries raw JSON values keyed by schema field name; validation
/// happens in [`crate::engine`] before anything is persisted.
#[derive(Debug, Clone)]
pub struct SubmissionPatch {
  pub student_id: Uuid,
  pub habit:      Habit,
  pub date:       NaiveDate,
  pub note:       Option<String>,
  pub photo:      Option<PhotoRef>,
  pub fields:     BTreeMap<String, serde_json::Value>,
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// Display state for a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldState {
  /// Checklist fields collapse to a checked flag.
  Checked(bool),
  /// Enum fields carry their raw value, once chosen.
  Choice(Option<String>),
  /// Time fields carry their raw value, once entered.
  Time(Option<NaiveTime>),
}

/// One schema field paired with its current stored value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
  pub name:  &'static str,
  pub label: &'static str,
  #[serde(flatten)]
  pub state: FieldState,
}

/// The labeled read model for one submission — assembled from the ledger
/// row, its detail row, and the habit schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionView {
  pub submission_id: Uuid,
  pub student_id:    Uuid,
  pub habit:         Habit,
  pub date:          NaiveDate,
  pub primary_time:  Option<NaiveTime>,
  pub photo:         Option<PhotoRef>,
  pub note:          Option<String>,
  pub approval:      Approval,
  /// Schema-ordered: the primary-time slot first (when the habit has
  /// one), then every detail field.
  pub fields:        Vec<FieldView>,
}

impl SubmissionView {
  pub fn assemble(submission: &Submission, detail: &HabitDetail) -> Self {
    let schema = schema_for(submission.habit);
    let mut fields = Vec::with_capacity(schema.fields.len() + 1);

    if let Some(pt) = &schema.primary_time {
      fields.push(FieldView {
        name:  pt.name,
        label: pt.label,
        state: FieldState::Time(submission.primary_time),
      });
    }

    for spec in schema.fields {
      let state = match spec.kind {
        FieldKind::Bool => FieldState::Checked(matches!(
          detail.get(spec.name),
          Some(FieldValue::Bool(true))
        )),
        FieldKind::Enum(_) => FieldState::Choice(match detail.get(spec.name) {
          Some(FieldValue::Choice(s)) => Some(s),
          _ => None,
        }),
        FieldKind::Time => FieldState::Time(match detail.get(spec.name) {
          Some(FieldValue::Time(t)) => Some(t),
          _ => None,
        }),
      };
      fields.push(FieldView {
        name: spec.name,
        label: spec.label,
        state,
      });
    }

    Self {
      submission_id: submission.submission_id,
      student_id: submission.student_id,
      habit: submission.habit,
      date: submission.date,
      primary_time: submission.primary_time,
      photo: submission.photo.clone(),
      note: submission.note.clone(),
      approval: submission.approval.clone(),
      fields,
    }
  }

  /// Convenience lookup for a field's display state.
  pub fn field(&self, name: &str) -> Option<&FieldState> {
    self.fields.iter().find(|f| f.name == name).map(|f| &f.state)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn submission(habit: Habit) -> Submission {
    Submission {
      submission_id: Uuid::new_v4(),
      student_id:    Uuid::new_v4(),
      habit,
      date:          NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
      primary_time:  None,
      photo:         None,
      note:          None,
      approval:      Approval::Pending,
      created_at:    Utc::now(),
      updated_at:    Utc::now(),
    }
  }

  #[test]
  fn year_month_parse_and_display() {
    let ym: YearMonth = "2025-03".parse().unwrap();
    assert_eq!(ym.to_string(), "2025-03");
    assert_eq!((ym.year(), ym.month()), (2025, 3));
    assert!("2025-13".parse::<YearMonth>().is_err());
    assert!("march".parse::<YearMonth>().is_err());
  }

  #[test]
  fn year_month_next_wraps_december() {
    let december: YearMonth = "2025-12".parse().unwrap();
    assert_eq!(december.next().to_string(), "2026-01");
  }

  #[test]
  fn year_month_contains() {
    let ym: YearMonth = "2025-03".parse().unwrap();
    assert!(ym.contains(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()));
    assert!(!ym.contains(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()));
  }

  #[test]
  fn view_lists_primary_time_first() {
    let mut sub = submission(Habit::WakeUp);
    sub.primary_time = NaiveTime::from_hms_opt(6, 15, 0);
    let detail = HabitDetail::empty(Habit::WakeUp);

    let view = SubmissionView::assemble(&sub, &detail);
    assert_eq!(view.fields[0].name, "wake_time");
    assert_eq!(
      view.fields[0].state,
      FieldState::Time(NaiveTime::from_hms_opt(6, 15, 0))
    );
    // The four checklist fields follow, unchecked.
    assert_eq!(view.fields.len(), 5);
    assert!(view.fields[1..]
      .iter()
      .all(|f| f.state == FieldState::Checked(false)));
  }

  #[test]
  fn view_reflects_detail_values() {
    let sub = submission(Habit::Nutrition);
    let mut detail = HabitDetail::empty(Habit::Nutrition);
    detail
      .set("lunch", &FieldValue::Choice("balanced".to_string()))
      .unwrap();
    detail.set("avoided_junk_food", &FieldValue::Bool(true)).unwrap();

    let view = SubmissionView::assemble(&sub, &detail);
    assert_eq!(
      view.field("lunch"),
      Some(&FieldState::Choice(Some("balanced".to_string())))
    );
    assert_eq!(view.field("breakfast"), Some(&FieldState::Choice(None)));
    assert_eq!(
      view.field("avoided_junk_food"),
      Some(&FieldState::Checked(true))
    );
  }
}
