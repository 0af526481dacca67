//! Seasonal calendar.

use async_trait::async_trait;

use crate::backend::error::ApiResult;
use crate::models::{CalendarEvents, MessageResponse, NewCalendarEvent, UserId};

#[async_trait]
pub trait CalendarBackend: Send + Sync {
    /// Events of one month for a user.
    ///
    /// The result merges the user's saved irrigation steps, the harvest dates
    /// of their active listings and the events they created.
    ///
    /// # Arguments
    /// * `year` - Calendar year
    /// * `month` - Month number, 1 to 12
    /// * `user_id` - Owner of the events
    async fn calendar_events(
        &self,
        year: i32,
        month: u32,
        user_id: UserId,
    ) -> ApiResult<CalendarEvents>;

    async fn add_event(&self, event: &NewCalendarEvent) -> ApiResult<MessageResponse>;
}
