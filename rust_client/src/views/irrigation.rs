//! Irrigation planner: preview a schedule, save it, track its steps.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

use super::state::{settle_items, Refresh, ViewState};
use crate::backend::{ApiError, ApiResult, FullBackend};
use crate::models::{
    IrrigationSchedule, MessageResponse, SaveScheduleRequest, SavedSchedule, ScheduleId, StepId,
};
use crate::session::SessionContext;

/// The generated preview together with the inputs it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulePreview {
    pub region: String,
    pub planting_date: NaiveDate,
    pub schedule: IrrigationSchedule,
}

pub struct IrrigationView {
    backend: Arc<dyn FullBackend>,
    session: Arc<SessionContext>,
    pub preview: ViewState<SchedulePreview>,
    pub saved: ViewState<Vec<SavedSchedule>>,
}

impl IrrigationView {
    pub fn new(backend: Arc<dyn FullBackend>, session: Arc<SessionContext>) -> Self {
        Self {
            backend,
            session,
            preview: ViewState::Idle,
            saved: ViewState::Idle,
        }
    }

    /// Build a preview schedule. Nothing is stored until [`save`](Self::save).
    pub async fn generate(
        &mut self,
        crop: &str,
        planting_date: NaiveDate,
        region: &str,
    ) -> ApiResult<()> {
        self.preview = ViewState::Loading;
        match self
            .backend
            .generate_schedule(crop, planting_date, region)
            .await
        {
            Ok(schedule) if schedule.reminders.is_empty() => {
                self.preview = ViewState::Empty;
                Ok(())
            }
            Ok(schedule) => {
                self.preview = ViewState::Ready(SchedulePreview {
                    region: region.to_string(),
                    planting_date,
                    schedule,
                });
                Ok(())
            }
            Err(e) => {
                self.preview = ViewState::failed(&e);
                Err(e)
            }
        }
    }

    /// Persist the preview for the signed-in farmer.
    pub async fn save(&mut self) -> ApiResult<MessageResponse> {
        let user = self.session.get_session().ok_or_else(|| {
            ApiError::validation("User identification lost. Please log out and back in.")
        })?;
        let preview = self.preview.data().ok_or_else(|| {
            ApiError::validation("No cycle data to save. Please generate a schedule first.")
        })?;

        let request = SaveScheduleRequest {
            user_id: user.id,
            crop_name: preview.schedule.crop_name.clone(),
            region: preview.region.clone(),
            planting_date: preview.planting_date,
            reminders: preview.schedule.reminders.clone(),
        };
        let response = self.backend.save_schedule(&request).await?;
        self.refresh().await?;
        Ok(response)
    }

    pub async fn toggle_step(&mut self, step_id: StepId) -> ApiResult<()> {
        self.backend.toggle_step(step_id).await?;
        self.refresh().await
    }

    pub async fn delete_schedule(&mut self, schedule_id: ScheduleId) -> ApiResult<()> {
        self.backend.delete_schedule(schedule_id).await?;
        self.refresh().await
    }
}

#[async_trait]
impl Refresh for IrrigationView {
    /// Reload the saved schedules of the signed-in user.
    async fn refresh(&mut self) -> ApiResult<()> {
        let user = match self.session.get_session() {
            Some(user) => user,
            None => {
                self.saved = ViewState::Idle;
                return Ok(());
            }
        };
        self.saved = ViewState::Loading;
        let result = self.backend.list_saved_schedules(user.id).await;
        settle_items(&mut self.saved, result)
    }
}
