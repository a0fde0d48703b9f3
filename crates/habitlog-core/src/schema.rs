//! The static habit field schema registry.
//!
//! One schema per habit category, built at compile time. A schema names the
//! category's optional ledger-level time-of-day slot plus every detail
//! field, with its value kind and mutability. The upsert engine consults
//! this table to validate payloads and route each field to the right row.

use chrono::NaiveTime;
use serde::Serialize;

use crate::{
  error::{Error, Result},
  habit::Habit,
};

// ─── Field metadata ──────────────────────────────────────────────────────────

/// The value kind a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "allowed", rename_all = "snake_case")]
pub enum FieldKind {
  Bool,
  /// A closed set of allowed string values.
  Enum(&'static [&'static str]),
  /// Time of day, accepted as `HH:MM` or `HH:MM:SS`.
  Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
  /// Once non-empty, later writes are silently skipped.
  WriteOnce,
  Editable,
}

/// One field of a habit schema.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
  pub name:       &'static str,
  pub label:      &'static str,
  pub kind:       FieldKind,
  pub mutability: Mutability,
}

/// The full schema for one habit category.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HabitSchema {
  pub habit:        Habit,
  /// The ledger-level time-of-day slot, when the habit has one.
  /// Semantics vary by habit (wake time, exercise time, sleep time).
  pub primary_time: Option<FieldSpec>,
  pub fields:       &'static [FieldSpec],
}

impl HabitSchema {
  /// Look up a field by payload key; the primary-time slot is included.
  pub fn field(&self, name: &str) -> Option<&FieldSpec> {
    if let Some(pt) = &self.primary_time
      && pt.name == name
    {
      return Some(pt);
    }
    self.fields.iter().find(|f| f.name == name)
  }

  /// Whether `name` is this habit's primary-time slot.
  pub fn is_primary_time(&self, name: &str) -> bool {
    self.primary_time.as_ref().is_some_and(|pt| pt.name == name)
  }
}

// ─── Field values ────────────────────────────────────────────────────────────

/// A validated, typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
  Bool(bool),
  Choice(String),
  Time(NaiveTime),
}

impl FieldValue {
  pub fn as_bool(&self, field: &str) -> Result<bool> {
    match self {
      Self::Bool(b) => Ok(*b),
      _ => Err(kind_mismatch(field, "a boolean")),
    }
  }

  pub fn as_choice(&self, field: &str) -> Result<&str> {
    match self {
      Self::Choice(s) => Ok(s),
      _ => Err(kind_mismatch(field, "an enum value")),
    }
  }

  pub fn as_time(&self, field: &str) -> Result<NaiveTime> {
    match self {
      Self::Time(t) => Ok(*t),
      _ => Err(kind_mismatch(field, "a time of day")),
    }
  }
}

fn kind_mismatch(field: &str, expected: &str) -> Error {
  Error::InvalidValue {
    field:   field.to_string(),
    message: format!("expected {expected}"),
  }
}

impl FieldSpec {
  /// Convert a raw JSON value into the typed representation, rejecting
  /// anything that does not map cleanly rather than coercing.
  pub fn parse_value(&self, raw: &serde_json::Value) -> Result<FieldValue> {
    match self.kind {
      FieldKind::Bool => raw
        .as_bool()
        .map(FieldValue::Bool)
        .ok_or_else(|| self.invalid("expected a boolean")),
      FieldKind::Enum(allowed) => {
        let s = raw
          .as_str()
          .ok_or_else(|| self.invalid("expected a string"))?;
        if allowed.contains(&s) {
          Ok(FieldValue::Choice(s.to_string()))
        } else {
          Err(self.invalid(&format!("expected one of {allowed:?}")))
        }
      }
      FieldKind::Time => {
        let s = raw
          .as_str()
          .ok_or_else(|| self.invalid("expected a time string"))?;
        NaiveTime::parse_from_str(s, "%H:%M:%S")
          .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
          .map(FieldValue::Time)
          .map_err(|_| self.invalid("expected HH:MM or HH:MM:SS"))
      }
    }
  }

  fn invalid(&self, message: &str) -> Error {
    Error::InvalidValue {
      field:   self.name.to_string(),
      message: message.to_string(),
    }
  }
}

// ─── Schema tables ───────────────────────────────────────────────────────────

const fn checkbox(name: &'static str, label: &'static str) -> FieldSpec {
  FieldSpec {
    name,
    label,
    kind: FieldKind::Bool,
    mutability: Mutability::Editable,
  }
}

const fn time_once(name: &'static str, label: &'static str) -> FieldSpec {
  FieldSpec {
    name,
    label,
    kind: FieldKind::Time,
    mutability: Mutability::WriteOnce,
  }
}

pub const MEAL_CHOICES: &[&str] = &["balanced", "light", "heavy", "skipped"];

pub const EXERCISE_ACTIVITIES: &[&str] =
  &["run", "cycle", "swim", "team_sport", "strength", "other"];

pub const COMMUNITY_KINDS: &[&str] =
  &["family", "neighborhood", "school", "mosque", "other"];

static WAKE_UP: HabitSchema = HabitSchema {
  habit:        Habit::WakeUp,
  primary_time: Some(time_once("wake_time", "Woke up at")),
  fields:       &[
    checkbox("made_bed", "Made the bed"),
    checkbox("tidied_room", "Tidied the room"),
    checkbox("bathed", "Bathed"),
    checkbox("had_breakfast", "Had breakfast"),
  ],
};

static EXERCISE: HabitSchema = HabitSchema {
  habit:        Habit::Exercise,
  primary_time: Some(time_once("exercise_time", "Exercised at")),
  fields:       &[
    FieldSpec {
      name:       "activity",
      label:      "Activity",
      kind:       FieldKind::Enum(EXERCISE_ACTIVITIES),
      mutability: Mutability::WriteOnce,
    },
    checkbox("stretched", "Stretched"),
    checkbox("broke_sweat", "Broke a sweat"),
  ],
};

static WORSHIP: HabitSchema = HabitSchema {
  habit:        Habit::Worship,
  primary_time: None,
  fields:       &[
    checkbox("fajr", "Fajr prayer"),
    checkbox("dhuhr", "Dhuhr prayer"),
    checkbox("asr", "Asr prayer"),
    checkbox("maghrib", "Maghrib prayer"),
    checkbox("isha", "Isha prayer"),
    checkbox("read_quran", "Read Quran"),
    checkbox("morning_dhikr", "Morning dhikr"),
    checkbox("evening_dhikr", "Evening dhikr"),
    checkbox("attended_study_circle", "Attended study circle"),
  ],
};

static STUDY: HabitSchema = HabitSchema {
  habit:        Habit::Study,
  primary_time: None,
  fields:       &[
    checkbox("did_homework", "Did homework"),
    checkbox("revised_lessons", "Revised lessons"),
    checkbox("read_book", "Read a book"),
    checkbox("memorised_vocabulary", "Memorised vocabulary"),
  ],
};

static NUTRITION: HabitSchema = HabitSchema {
  habit:        Habit::Nutrition,
  primary_time: None,
  fields:       &[
    FieldSpec {
      name:       "breakfast",
      label:      "Breakfast",
      kind:       FieldKind::Enum(MEAL_CHOICES),
      mutability: Mutability::Editable,
    },
    FieldSpec {
      name:       "lunch",
      label:      "Lunch",
      kind:       FieldKind::Enum(MEAL_CHOICES),
      mutability: Mutability::Editable,
    },
    FieldSpec {
      name:       "dinner",
      label:      "Dinner",
      kind:       FieldKind::Enum(MEAL_CHOICES),
      mutability: Mutability::Editable,
    },
    checkbox("avoided_junk_food", "Avoided junk food"),
  ],
};

static COMMUNITY: HabitSchema = HabitSchema {
  habit:        Habit::Community,
  primary_time: None,
  fields:       &[
    FieldSpec {
      name:       "kind",
      label:      "Kind of activity",
      kind:       FieldKind::Enum(COMMUNITY_KINDS),
      mutability: Mutability::Editable,
    },
    checkbox("helped_at_home", "Helped at home"),
    checkbox("helped_neighbor", "Helped a neighbor"),
    checkbox("group_activity", "Joined a group activity"),
  ],
};

static SLEEP_EARLY: HabitSchema = HabitSchema {
  habit:        Habit::SleepEarly,
  primary_time: Some(time_once("sleep_time", "Went to bed at")),
  fields:       &[
    checkbox("brushed_teeth", "Brushed teeth"),
    checkbox("bedtime_prayer", "Said the bedtime prayer"),
    checkbox("screen_free", "Screen-free before bed"),
  ],
};

/// The schema for `habit`. Total: the habit set is closed.
pub fn schema_for(habit: Habit) -> &'static HabitSchema {
  match habit {
    Habit::WakeUp => &WAKE_UP,
    Habit::Exercise => &EXERCISE,
    Habit::Worship => &WORSHIP,
    Habit::Study => &STUDY,
    Habit::Nutrition => &NUTRITION,
    Habit::Community => &COMMUNITY,
    Habit::SleepEarly => &SLEEP_EARLY,
  }
}
