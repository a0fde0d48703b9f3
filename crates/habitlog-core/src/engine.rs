//! The upsert merge engine.
//!
//! Backends own atomicity (one transaction per call); this module owns the
//! rules: which fields exist, which may still change, and where each one
//! lands (ledger row vs. detail row). Validation runs before any
//! persistence work so a failed call leaves no partial state.

use std::collections::BTreeMap;

use crate::{
  detail::HabitDetail,
  error::{Error, Result},
  habit::Habit,
  schema::{FieldSpec, FieldValue, Mutability, schema_for},
  submission::Submission,
};

// ─── Validated patch ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PatchEntry {
  pub spec:  FieldSpec,
  pub value: FieldValue,
}

/// A fully validated field payload, ready to merge.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
  pub entries: Vec<PatchEntry>,
}

/// Validate a raw payload against the habit's schema.
///
/// Unknown keys are rejected, not silently dropped, to surface client
/// bugs; values must type-check against the field's kind.
pub fn validate_fields(
  habit: Habit,
  raw: &BTreeMap<String, serde_json::Value>,
) -> Result<FieldPatch> {
  let schema = schema_for(habit);
  let mut entries = Vec::with_capacity(raw.len());
  for (name, value) in raw {
    let spec = schema.field(name).ok_or_else(|| Error::UnknownField {
      habit,
      field: name.clone(),
    })?;
    entries.push(PatchEntry {
      spec:  *spec,
      value: spec.parse_value(value)?,
    });
  }
  Ok(FieldPatch { entries })
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Which payload fields the write-once rule skipped.
#[derive(Debug, Default)]
pub struct MergeOutcome {
  pub skipped: Vec<&'static str>,
}

/// Merge a validated patch into the submission and its detail.
///
/// Fails with [`Error::SubmissionLocked`] when the submission is approved
/// (the whole call, before any mutation). Write-once fields that already
/// hold a value are skipped, not errors: a client may resend a full
/// payload that includes already-set fields without corrupting prior
/// state. Everything else is overwritten.
pub fn merge(
  submission: &mut Submission,
  detail: &mut HabitDetail,
  patch: &FieldPatch,
  note: Option<&str>,
) -> Result<MergeOutcome> {
  if submission.approval.is_approved() {
    return Err(Error::SubmissionLocked(submission.submission_id));
  }

  let schema = schema_for(submission.habit);
  let mut outcome = MergeOutcome::default();

  for entry in &patch.entries {
    let name = entry.spec.name;
    let write_once = matches!(entry.spec.mutability, Mutability::WriteOnce);

    if schema.is_primary_time(name) {
      if write_once && submission.primary_time.is_some() {
        outcome.skipped.push(name);
        continue;
      }
      submission.primary_time = Some(entry.value.as_time(name)?);
    } else {
      if write_once && detail.get(name).is_some() {
        outcome.skipped.push(name);
        continue;
      }
      detail.set(name, &entry.value)?;
    }
  }

  if let Some(note) = note {
    submission.note = Some(note.to_string());
  }

  Ok(outcome)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{NaiveDate, NaiveTime, Utc};
  use serde_json::json;
  use uuid::Uuid;

  use crate::approval::Approval;

  fn raw(pairs: &[(&str, serde_json::Value)]) -> BTreeMap<String, serde_json::Value> {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.clone()))
      .collect()
  }

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
  fn validate_rejects_unknown_keys() {
    let err =
      validate_fields(Habit::WakeUp, &raw(&[("wingspan", json!(true))]))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownField { field, .. } if field == "wingspan"));
  }

  #[test]
  fn validate_rejects_ill_typed_values() {
    let err =
      validate_fields(Habit::WakeUp, &raw(&[("made_bed", json!("yes"))]))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { field, .. } if field == "made_bed"));

    let err =
      validate_fields(Habit::WakeUp, &raw(&[("wake_time", json!("6am"))]))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { field, .. } if field == "wake_time"));
  }

  #[test]
  fn merge_routes_primary_time_to_ledger() {
    let mut sub = submission(Habit::WakeUp);
    let mut detail = HabitDetail::empty(Habit::WakeUp);
    let patch = validate_fields(
      Habit::WakeUp,
      &raw(&[("wake_time", json!("06:15")), ("made_bed", json!(true))]),
    )
    .unwrap();

    let outcome = merge(&mut sub, &mut detail, &patch, None).unwrap();
    assert!(outcome.skipped.is_empty());
    assert_eq!(sub.primary_time, NaiveTime::from_hms_opt(6, 15, 0));
    assert_eq!(detail.get("made_bed"), Some(FieldValue::Bool(true)));
  }

  #[test]
  fn merge_skips_already_set_write_once_fields() {
    let mut sub = submission(Habit::WakeUp);
    let mut detail = HabitDetail::empty(Habit::WakeUp);

    let first =
      validate_fields(Habit::WakeUp, &raw(&[("wake_time", json!("06:15"))]))
        .unwrap();
    merge(&mut sub, &mut detail, &first, None).unwrap();

    // Resending the full payload with a different time must not change it.
    let second = validate_fields(
      Habit::WakeUp,
      &raw(&[("wake_time", json!("07:00")), ("tidied_room", json!(true))]),
    )
    .unwrap();
    let outcome = merge(&mut sub, &mut detail, &second, None).unwrap();

    assert_eq!(outcome.skipped, vec!["wake_time"]);
    assert_eq!(sub.primary_time, NaiveTime::from_hms_opt(6, 15, 0));
    assert_eq!(detail.get("tidied_room"), Some(FieldValue::Bool(true)));
  }

  #[test]
  fn merge_skips_write_once_detail_field() {
    let mut sub = submission(Habit::Exercise);
    let mut detail = HabitDetail::empty(Habit::Exercise);

    let first =
      validate_fields(Habit::Exercise, &raw(&[("activity", json!("run"))]))
        .unwrap();
    merge(&mut sub, &mut detail, &first, None).unwrap();

    let second =
      validate_fields(Habit::Exercise, &raw(&[("activity", json!("swim"))]))
        .unwrap();
    let outcome = merge(&mut sub, &mut detail, &second, None).unwrap();

    assert_eq!(outcome.skipped, vec!["activity"]);
    assert_eq!(
      detail.get("activity"),
      Some(FieldValue::Choice("run".to_string()))
    );
  }

  #[test]
  fn merge_overwrites_editable_fields() {
    let mut sub = submission(Habit::Nutrition);
    let mut detail = HabitDetail::empty(Habit::Nutrition);

    let first =
      validate_fields(Habit::Nutrition, &raw(&[("lunch", json!("skipped"))]))
        .unwrap();
    merge(&mut sub, &mut detail, &first, None).unwrap();

    let second =
      validate_fields(Habit::Nutrition, &raw(&[("lunch", json!("balanced"))]))
        .unwrap();
    merge(&mut sub, &mut detail, &second, None).unwrap();

    assert_eq!(
      detail.get("lunch"),
      Some(FieldValue::Choice("balanced".to_string()))
    );
  }

  #[test]
  fn merge_refuses_approved_submission() {
    let mut sub = submission(Habit::WakeUp);
    sub.approval = Approval::Pending
      .approve(Uuid::new_v4(), Utc::now())
      .unwrap();
    let mut detail = HabitDetail::empty(Habit::WakeUp);

    let patch =
      validate_fields(Habit::WakeUp, &raw(&[("made_bed", json!(true))]))
        .unwrap();
    let err = merge(&mut sub, &mut detail, &patch, None).unwrap_err();

    assert!(matches!(err, Error::SubmissionLocked(id) if id == sub.submission_id));
    assert_eq!(detail.get("made_bed"), Some(FieldValue::Bool(false)));
  }

  #[test]
  fn merge_updates_note() {
    let mut sub = submission(Habit::Study);
    let mut detail = HabitDetail::empty(Habit::Study);

    merge(&mut sub, &mut detail, &FieldPatch::default(), Some("late start"))
      .unwrap();
    assert_eq!(sub.note.as_deref(), Some("late start"));

    // Absent note leaves the stored one alone.
    merge(&mut sub, &mut detail, &FieldPatch::default(), None).unwrap();
    assert_eq!(sub.note.as_deref(), Some("late start"));
  }
}
