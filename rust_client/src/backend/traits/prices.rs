//! Crowd-sourced market prices.

use async_trait::async_trait;

use crate::backend::error::ApiResult;
use crate::models::{MessageResponse, PriceId, PriceSubmission, PriceSummary, UserId};

/// Backend trait for market price reports.
#[async_trait]
pub trait PriceBackend: Send + Sync {
    /// Latest prices, one summary per crop and region.
    async fn list_prices(&self) -> ApiResult<Vec<PriceSummary>>;

    /// Report a new price.
    async fn submit_price(&self, submission: &PriceSubmission) -> ApiResult<MessageResponse>;

    /// Retract a price report.
    ///
    /// # Arguments
    /// * `price_id` - Report to retract
    /// * `user_id` - Caller; must be the one who submitted the report
    ///
    /// # Returns
    /// * `Ok(MessageResponse)` - On success
    /// * `Err(ApiError)` with status 404 - Unknown or already retracted report
    /// * `Err(ApiError)` with status 403 - Report belongs to someone else
    async fn delete_price(&self, price_id: PriceId, user_id: UserId)
        -> ApiResult<MessageResponse>;
}
