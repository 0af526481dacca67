//! Seasonal calendar for one month at a time.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

use super::state::{Refresh, ViewState};
use crate::backend::{ApiError, ApiResult, FullBackend};
use crate::models::{
    CalendarEvent, MessageResponse, NewCalendarEvent, KIND_HARVEST, KIND_IRRIGATION,
};
use crate::session::SessionContext;

/// Event kinds offered by the filter tabs, `"all"` first.
pub const EVENT_FILTERS: &[&str] = &[
    "all",
    "irrigation",
    "harvest",
    "marketplace",
    "buyer_request",
];

/// Counts shown next to the month grid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthSummary {
    pub irrigation: usize,
    pub harvest: usize,
    pub listings: usize,
    /// Sum of the value carried by harvest events.
    pub harvest_value: f64,
}

/// Month after `(year, month)`.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Month before `(year, month)`.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub struct CalendarView {
    backend: Arc<dyn FullBackend>,
    session: Arc<SessionContext>,
    year: i32,
    month: u32,
    /// `"all"` or one event kind.
    pub filter: String,
    pub events: ViewState<Vec<CalendarEvent>>,
}

impl CalendarView {
    /// Start on the month containing `today`.
    pub fn new(
        backend: Arc<dyn FullBackend>,
        session: Arc<SessionContext>,
        today: NaiveDate,
    ) -> Self {
        Self {
            backend,
            session,
            year: today.year(),
            month: today.month(),
            filter: "all".to_string(),
            events: ViewState::Idle,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Move to a given month without fetching.
    pub fn set_month(&mut self, year: i32, month: u32) -> ApiResult<()> {
        if !(1..=12).contains(&month) {
            return Err(ApiError::validation(format!("Invalid month: {}", month)));
        }
        self.year = year;
        self.month = month;
        Ok(())
    }

    pub async fn next_month(&mut self) -> ApiResult<()> {
        (self.year, self.month) = next_month(self.year, self.month);
        self.refresh().await
    }

    pub async fn previous_month(&mut self) -> ApiResult<()> {
        (self.year, self.month) = previous_month(self.year, self.month);
        self.refresh().await
    }

    /// Events on `date` that pass the kind filter.
    pub fn events_on(&self, date: NaiveDate) -> Vec<&CalendarEvent> {
        self.events
            .items()
            .iter()
            .filter(|e| e.date == date)
            .filter(|e| self.filter == "all" || e.kind == self.filter)
            .collect()
    }

    pub fn summary(&self) -> MonthSummary {
        let events = self.events.items();
        MonthSummary {
            irrigation: events.iter().filter(|e| e.kind == KIND_IRRIGATION).count(),
            harvest: events.iter().filter(|e| e.kind == KIND_HARVEST).count(),
            listings: events.iter().filter(|e| e.kind == "marketplace").count(),
            harvest_value: events
                .iter()
                .filter(|e| e.kind == KIND_HARVEST)
                .filter_map(|e| e.value)
                .sum(),
        }
    }

    /// Add a personal event for the signed-in user, then reload the month.
    pub async fn add_event(
        &mut self,
        title: &str,
        kind: &str,
        date: NaiveDate,
        notes: &str,
    ) -> ApiResult<MessageResponse> {
        let user = self.session.require_session("add calendar events")?;
        if title.trim().is_empty() {
            return Err(ApiError::validation("Event title is required"));
        }
        let event = NewCalendarEvent {
            user_id: user.id,
            title: title.trim().to_string(),
            kind: kind.to_string(),
            date,
            notes: notes.to_string(),
        };
        let response = self.backend.add_event(&event).await?;
        self.refresh().await?;
        Ok(response)
    }
}

#[async_trait]
impl Refresh for CalendarView {
    async fn refresh(&mut self) -> ApiResult<()> {
        let user = match self.session.get_session() {
            Some(user) => user,
            None => {
                self.events = ViewState::Idle;
                return Ok(());
            }
        };
        self.events = ViewState::Loading;
        match self
            .backend
            .calendar_events(self.year, self.month, user.id)
            .await
        {
            Ok(envelope) => {
                let mut events = envelope.events;
                events.sort_by_key(|e| e.date);
                self.events = ViewState::from_items(events);
                Ok(())
            }
            Err(e) => {
                self.events = ViewState::failed(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_navigation_wraps_year() {
        assert_eq!(next_month(2024, 12), (2025, 1));
        assert_eq!(next_month(2024, 6), (2024, 7));
        assert_eq!(previous_month(2025, 1), (2024, 12));
        assert_eq!(previous_month(2025, 3), (2025, 2));
    }
}
