//! Irrigation schedule generation and saved-schedule tracking.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::backend::error::ApiResult;
use crate::models::{
    IrrigationSchedule, MessageResponse, SaveScheduleRequest, SavedSchedule, ScheduleId, StepId,
    UserId,
};

/// Backend trait for irrigation schedules.
///
/// Generation is stateless on the server; saved schedules belong to a user
/// and their steps can be ticked off one by one.
#[async_trait]
pub trait IrrigationBackend: Send + Sync {
    /// Generate a schedule preview.
    ///
    /// # Arguments
    /// * `crop` - Crop name
    /// * `planting_date` - Day the crop was planted
    /// * `region` - Region name; some regions shift every reminder
    ///
    /// # Returns
    /// * `Ok(IrrigationSchedule)` - Possibly with no reminders for unknown crops
    async fn generate_schedule(
        &self,
        crop: &str,
        planting_date: NaiveDate,
        region: &str,
    ) -> ApiResult<IrrigationSchedule>;

    /// Save a previewed schedule for a user.
    ///
    /// # Returns
    /// * `Ok(MessageResponse)` - Carries the new schedule id
    async fn save_schedule(&self, request: &SaveScheduleRequest) -> ApiResult<MessageResponse>;

    /// List every schedule saved by a user, newest first.
    async fn list_saved_schedules(&self, user_id: UserId) -> ApiResult<Vec<SavedSchedule>>;

    /// Flip the completion state of one saved step.
    async fn toggle_step(&self, step_id: StepId) -> ApiResult<MessageResponse>;

    /// Delete a saved schedule with all of its steps.
    async fn delete_schedule(&self, schedule_id: ScheduleId) -> ApiResult<MessageResponse>;
}
