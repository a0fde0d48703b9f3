//! The closed set of daily habit categories.
//!
//! Habit categories and their field schemas are statically known; there is
//! no runtime registration. The schema for each category lives in
//! [`crate::schema`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the seven fixed daily-tracking categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Habit {
  WakeUp,
  Exercise,
  Worship,
  Study,
  Nutrition,
  Community,
  SleepEarly,
}

impl Habit {
  /// Every habit, in display order.
  pub const ALL: [Self; 7] = [
    Self::WakeUp,
    Self::Exercise,
    Self::Worship,
    Self::Study,
    Self::Nutrition,
    Self::Community,
    Self::SleepEarly,
  ];

  /// The stable identifier used in payloads, URLs, and database rows.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::WakeUp => "wake_up",
      Self::Exercise => "exercise",
      Self::Worship => "worship",
      Self::Study => "study",
      Self::Nutrition => "nutrition",
      Self::Community => "community",
      Self::SleepEarly => "sleep_early",
    }
  }

  /// Human-readable category label.
  pub fn label(self) -> &'static str {
    match self {
      Self::WakeUp => "Waking up early",
      Self::Exercise => "Exercise",
      Self::Worship => "Worship",
      Self::Study => "Study",
      Self::Nutrition => "Healthy eating",
      Self::Community => "Community activity",
      Self::SleepEarly => "Sleeping early",
    }
  }
}

impl fmt::Display for Habit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Habit {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "wake_up" => Ok(Self::WakeUp),
      "exercise" => Ok(Self::Exercise),
      "worship" => Ok(Self::Worship),
      "study" => Ok(Self::Study),
      "nutrition" => Ok(Self::Nutrition),
      "community" => Ok(Self::Community),
      "sleep_early" => Ok(Self::SleepEarly),
      other => Err(Error::UnknownHabit(other.to_string())),
    }
  }
}
