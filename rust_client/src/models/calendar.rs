//! Seasonal calendar events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::account::UserId;
use super::null_as_default;
use super::macros::wire_ids;

wire_ids! { EventId }

/// Event kinds the server derives on its own; user events may carry any other label.
pub const KIND_IRRIGATION: &str = "irrigation";
pub const KIND_HARVEST: &str = "harvest";

/// One entry of the monthly calendar.
///
/// Irrigation steps, harvest dates of active listings and user-created events
/// are merged by the server into a single list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub date: NaiveDate,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Expected harvest value in USD, only set for harvest events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl CalendarEvent {
    pub fn is_irrigation(&self) -> bool {
        self.kind == KIND_IRRIGATION
    }

    pub fn is_harvest(&self) -> bool {
        self.kind == KIND_HARVEST
    }
}

/// Response envelope of `GET /api/calendar/events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvents {
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: Vec<CalendarEvent>,
}

/// Body of `POST /api/calendar/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCalendarEvent {
    pub user_id: UserId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
}
