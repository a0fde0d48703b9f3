//! Handler for `GET /habits` — the static habit catalog.
//!
//! Clients render their forms from this: the schema registry is the single
//! source of field names, labels, kinds, and allowed enum values.

use axum::Json;
use habitlog_core::{
  habit::Habit,
  schema::{FieldSpec, schema_for},
};
use serde::Serialize;

/// One habit category with its full field schema.
#[derive(Debug, Clone, Serialize)]
pub struct HabitEntry {
  pub id:           &'static str,
  pub label:        &'static str,
  pub primary_time: Option<&'static FieldSpec>,
  pub fields:       &'static [FieldSpec],
}

/// `GET /habits`
pub async fn list() -> Json<Vec<HabitEntry>> {
  let entries = Habit::ALL
    .iter()
    .map(|&habit| {
      let schema = schema_for(habit);
      HabitEntry {
        id:           habit.as_str(),
        label:        habit.label(),
        primary_time: schema.primary_time.as_ref(),
        fields:       schema.fields,
      }
    })
    .collect();
  Json(entries)
}
