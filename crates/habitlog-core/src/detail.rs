//! Per-habit detail payloads — the habit-specific half of a submission.
//!
//! Each habit category carries only its own fields, so the detail is a
//! tagged union with one variant per habit. The upsert engine is written
//! once against the uniform [`HabitDetail::get`]/[`HabitDetail::set`]
//! surface and dispatches by tag.

use serde::{Deserialize, Serialize};

use crate::{
  error::{Error, Result},
  habit::Habit,
  schema::FieldValue,
};

// ─── Per-habit structs ───────────────────────────────────────────────────────

/// Morning checklist for the wake-up habit. The wake time itself lives on
/// the ledger row as the habit's primary-time slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WakeUpDetail {
  pub made_bed:      bool,
  pub tidied_room:   bool,
  pub bathed:        bool,
  pub had_breakfast: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDetail {
  /// What kind of exercise; locked once chosen.
  pub activity:    Option<String>,
  pub stretched:   bool,
  pub broke_sweat: bool,
}

/// The five daily prayers plus post-prayer activities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorshipDetail {
  pub fajr:                  bool,
  pub dhuhr:                 bool,
  pub asr:                   bool,
  pub maghrib:               bool,
  pub isha:                  bool,
  pub read_quran:            bool,
  pub morning_dhikr:         bool,
  pub evening_dhikr:         bool,
  pub attended_study_circle: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyDetail {
  pub did_homework:         bool,
  pub revised_lessons:      bool,
  pub read_book:            bool,
  pub memorised_vocabulary: bool,
}

/// Nutrition slots carry one of the allowed meal gradings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionDetail {
  pub breakfast:         Option<String>,
  pub lunch:             Option<String>,
  pub dinner:            Option<String>,
  pub avoided_junk_food: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityDetail {
  pub kind:            Option<String>,
  pub helped_at_home:  bool,
  pub helped_neighbor: bool,
  pub group_activity:  bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SleepEarlyDetail {
  pub brushed_teeth:  bool,
  pub bedtime_prayer: bool,
  pub screen_free:    bool,
}

// ─── Tagged union ────────────────────────────────────────────────────────────

/// The habit-specific field payload attached 1:1 to a submission.
/// The tag always matches the owning submission's habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "habit", rename_all = "snake_case")]
pub enum HabitDetail {
  WakeUp(WakeUpDetail),
  Exercise(ExerciseDetail),
  Worship(WorshipDetail),
  Study(StudyDetail),
  Nutrition(NutritionDetail),
  Community(CommunityDetail),
  SleepEarly(SleepEarlyDetail),
}

impl HabitDetail {
  /// An all-unset detail for `habit`; created together with the ledger row.
  pub fn empty(habit: Habit) -> Self {
    match habit {
      Habit::WakeUp => Self::WakeUp(WakeUpDetail::default()),
      Habit::Exercise => Self::Exercise(ExerciseDetail::default()),
      Habit::Worship => Self::Worship(WorshipDetail::default()),
      Habit::Study => Self::Study(StudyDetail::default()),
      Habit::Nutrition => Self::Nutrition(NutritionDetail::default()),
      Habit::Community => Self::Community(CommunityDetail::default()),
      Habit::SleepEarly => Self::SleepEarly(SleepEarlyDetail::default()),
    }
  }

  pub fn habit(&self) -> Habit {
    match self {
      Self::WakeUp(_) => Habit::WakeUp,
      Self::Exercise(_) => Habit::Exercise,
      Self::Worship(_) => Habit::Worship,
      Self::Study(_) => Habit::Study,
      Self::Nutrition(_) => Habit::Nutrition,
      Self::Community(_) => Habit::Community,
      Self::SleepEarly(_) => Habit::SleepEarly,
    }
  }

  /// The current value of `field`, or `None` when the field is unset
  /// (or not part of this variant). Booleans are always set.
  pub fn get(&self, field: &str) -> Option<FieldValue> {
    match self {
      Self::WakeUp(d) => d.get(field),
      Self::Exercise(d) => d.get(field),
      Self::Worship(d) => d.get(field),
      Self::Study(d) => d.get(field),
      Self::Nutrition(d) => d.get(field),
      Self::Community(d) => d.get(field),
      Self::SleepEarly(d) => d.get(field),
    }
  }

  /// Overwrite `field` with `value`. The caller is expected to have
  /// validated both against the habit's schema.
  pub fn set(&mut self, field: &str, value: &FieldValue) -> Result<()> {
    let known = match self {
      Self::WakeUp(d) => d.set(field, value)?,
      Self::Exercise(d) => d.set(field, value)?,
      Self::Worship(d) => d.set(field, value)?,
      Self::Study(d) => d.set(field, value)?,
      Self::Nutrition(d) => d.set(field, value)?,
      Self::Community(d) => d.set(field, value)?,
      Self::SleepEarly(d) => d.set(field, value)?,
    };
    if known {
      Ok(())
    } else {
      Err(Error::UnknownField {
        habit: self.habit(),
        field: field.to_string(),
      })
    }
  }
}

// ─── Per-variant dispatch ────────────────────────────────────────────────────

impl WakeUpDetail {
  fn get(&self, field: &str) -> Option<FieldValue> {
    match field {
      "made_bed" => Some(FieldValue::Bool(self.made_bed)),
      "tidied_room" => Some(FieldValue::Bool(self.tidied_room)),
      "bathed" => Some(FieldValue::Bool(self.bathed)),
      "had_breakfast" => Some(FieldValue::Bool(self.had_breakfast)),
      _ => None,
    }
  }

  fn set(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
    match field {
      "made_bed" => self.made_bed = value.as_bool(field)?,
      "tidied_room" => self.tidied_room = value.as_bool(field)?,
      "bathed" => self.bathed = value.as_bool(field)?,
      "had_breakfast" => self.had_breakfast = value.as_bool(field)?,
      _ => return Ok(false),
    }
    Ok(true)
  }
}

impl ExerciseDetail {
  fn get(&self, field: &str) -> Option<FieldValue> {
    match field {
      "activity" => self.activity.clone().map(FieldValue::Choice),
      "stretched" => Some(FieldValue::Bool(self.stretched)),
      "broke_sweat" => Some(FieldValue::Bool(self.broke_sweat)),
      _ => None,
    }
  }

  fn set(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
    match field {
      "activity" => self.activity = Some(value.as_choice(field)?.to_string()),
      "stretched" => self.stretched = value.as_bool(field)?,
      "broke_sweat" => self.broke_sweat = value.as_bool(field)?,
      _ => return Ok(false),
    }
    Ok(true)
  }
}

impl WorshipDetail {
  fn get(&self, field: &str) -> Option<FieldValue> {
    let checked = match field {
      "fajr" => self.fajr,
      "dhuhr" => self.dhuhr,
      "asr" => self.asr,
      "maghrib" => self.maghrib,
      "isha" => self.isha,
      "read_quran" => self.read_quran,
      "morning_dhikr" => self.morning_dhikr,
      "evening_dhikr" => self.evening_dhikr,
      "attended_study_circle" => self.attended_study_circle,
      _ => return None,
    };
    Some(FieldValue::Bool(checked))
  }

  fn set(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
    let slot = match field {
      "fajr" => &mut self.fajr,
      "dhuhr" => &mut self.dhuhr,
      "asr" => &mut self.asr,
      "maghrib" => &mut self.maghrib,
      "isha" => &mut self.isha,
      "read_quran" => &mut self.read_quran,
      "morning_dhikr" => &mut self.morning_dhikr,
      "evening_dhikr" => &mut self.evening_dhikr,
      "attended_study_circle" => &mut self.attended_study_circle,
      _ => return Ok(false),
    };
    *slot = value.as_bool(field)?;
    Ok(true)
  }
}

impl StudyDetail {
  fn get(&self, field: &str) -> Option<FieldValue> {
    match field {
      "did_homework" => Some(FieldValue::Bool(self.did_homework)),
      "revised_lessons" => Some(FieldValue::Bool(self.revised_lessons)),
      "read_book" => Some(FieldValue::Bool(self.read_book)),
      "memorised_vocabulary" => {
        Some(FieldValue::Bool(self.memorised_vocabulary))
      }
      _ => None,
    }
  }

  fn set(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
    match field {
      "did_homework" => self.did_homework = value.as_bool(field)?,
      "revised_lessons" => self.revised_lessons = value.as_bool(field)?,
      "read_book" => self.read_book = value.as_bool(field)?,
      "memorised_vocabulary" => {
        self.memorised_vocabulary = value.as_bool(field)?;
      }
      _ => return Ok(false),
    }
    Ok(true)
  }
}

impl NutritionDetail {
  fn get(&self, field: &str) -> Option<FieldValue> {
    match field {
      "breakfast" => self.breakfast.clone().map(FieldValue::Choice),
      "lunch" => self.lunch.clone().map(FieldValue::Choice),
      "dinner" => self.dinner.clone().map(FieldValue::Choice),
      "avoided_junk_food" => Some(FieldValue::Bool(self.avoided_junk_food)),
      _ => None,
    }
  }

  fn set(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
    match field {
      "breakfast" => self.breakfast = Some(value.as_choice(field)?.to_string()),
      "lunch" => self.lunch = Some(value.as_choice(field)?.to_string()),
      "dinner" => self.dinner = Some(value.as_choice(field)?.to_string()),
      "avoided_junk_food" => {
        self.avoided_junk_food = value.as_bool(field)?;
      }
      _ => return Ok(false),
    }
    Ok(true)
  }
}

impl CommunityDetail {
  fn get(&self, field: &str) -> Option<FieldValue> {
    match field {
      "kind" => self.kind.clone().map(FieldValue::Choice),
      "helped_at_home" => Some(FieldValue::Bool(self.helped_at_home)),
      "helped_neighbor" => Some(FieldValue::Bool(self.helped_neighbor)),
      "group_activity" => Some(FieldValue::Bool(self.group_activity)),
      _ => None,
    }
  }

  fn set(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
    match field {
      "kind" => self.kind = Some(value.as_choice(field)?.to_string()),
      "helped_at_home" => self.helped_at_home = value.as_bool(field)?,
      "helped_neighbor" => self.helped_neighbor = value.as_bool(field)?,
      "group_activity" => self.group_activity = value.as_bool(field)?,
      _ => return Ok(false),
    }
    Ok(true)
  }
}

impl SleepEarlyDetail {
  fn get(&self, field: &str) -> Option<FieldValue> {
    match field {
      "brushed_teeth" => Some(FieldValue::Bool(self.brushed_teeth)),
      "bedtime_prayer" => Some(FieldValue::Bool(self.bedtime_prayer)),
      "screen_free" => Some(FieldValue::Bool(self.screen_free)),
      _ => None,
    }
  }

  fn set(&mut self, field: &str, value: &FieldValue) -> Result<bool> {
    match field {
      "brushed_teeth" => self.brushed_teeth = value.as_bool(field)?,
      "bedtime_prayer" => self.bedtime_prayer = value.as_bool(field)?,
      "screen_free" => self.screen_free = value.as_bool(field)?,
      _ => return Ok(false),
    }
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::schema::schema_for;

  #[test]
  fn empty_detail_matches_habit() {
    for habit in Habit::ALL {
      assert_eq!(HabitDetail::empty(habit).habit(), habit);
    }
  }

  #[test]
  fn every_schema_field_dispatches() {
    // get/set must recognise exactly the detail fields the registry names.
    for habit in Habit::ALL {
      let mut detail = HabitDetail::empty(habit);
      for spec in schema_for(habit).fields {
        let value = match spec.kind {
          crate::schema::FieldKind::Bool => FieldValue::Bool(true),
          crate::schema::FieldKind::Enum(allowed) => {
            FieldValue::Choice(allowed[0].to_string())
          }
          crate::schema::FieldKind::Time => unreachable!("no time details"),
        };
        detail.set(spec.name, &value).unwrap();
        assert_eq!(detail.get(spec.name), Some(value), "{habit}.{}", spec.name);
      }
    }
  }

  #[test]
  fn unknown_field_is_rejected() {
    let mut detail = HabitDetail::empty(Habit::Study);
    let err = detail
      .set("wingspan", &FieldValue::Bool(true))
      .unwrap_err();
    assert!(matches!(err, Error::UnknownField { field, .. } if field == "wingspan"));
  }

  #[test]
  fn option_backed_fields_start_unset() {
    let detail = HabitDetail::empty(Habit::Exercise);
    assert_eq!(detail.get("activity"), None);
    assert_eq!(detail.get("stretched"), Some(FieldValue::Bool(false)));
  }
}
