//! Irrigation schedules: generated previews and saved, trackable copies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::account::UserId;
use super::null_as_default;
use super::macros::wire_ids;

wire_ids! {
    ScheduleId,
    /// One reminder of a saved schedule.
    StepId,
}

/// One watering reminder at a growth stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub date: NaiveDate,
    pub stage: String,
    pub action: String,
    #[serde(default)]
    pub notes: String,
}

/// Rule-based schedule returned by `GET /api/irrigation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationSchedule {
    pub crop_name: String,
    /// The server sends `null` for crops it has no rules for.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveScheduleRequest {
    pub user_id: UserId,
    pub crop_name: String,
    pub region: String,
    pub planting_date: NaiveDate,
    pub reminders: Vec<Reminder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStep {
    pub id: StepId,
    pub date: NaiveDate,
    pub stage: String,
    pub action: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SavedStep {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSchedule {
    pub id: ScheduleId,
    pub crop_name: String,
    #[serde(default)]
    pub region: String,
    pub planting_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<SavedStep>,
}

impl SavedSchedule {
    /// Fraction of steps already marked as done, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        let done = self.steps.iter().filter(|s| s.is_completed()).count();
        done as f64 / self.steps.len() as f64
    }
}
