//! Crop catalogue, estimates and backend health.

use async_trait::async_trait;

use crate::backend::error::ApiResult;
use crate::models::{Crop, Estimate};

/// Backend trait for the crop catalogue and yield estimates.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to be shared between view-models.
#[async_trait]
pub trait CatalogBackend: Send + Sync {
    // ==================== Health ====================

    /// Check whether the backend answers.
    ///
    /// # Returns
    /// - `Ok(true)` if the backend is reachable and healthy
    /// - `Ok(false)` if it answered but reported itself unhealthy
    /// - `Err(ApiError)` if the check itself failed
    async fn health_check(&self) -> ApiResult<bool>;

    // ==================== Catalogue ====================

    /// List all crop types.
    async fn list_crops(&self) -> ApiResult<Vec<Crop>>;

    /// Yield and income estimate for a crop.
    ///
    /// # Arguments
    /// * `crop` - Crop name, matched exactly
    /// * `area_ha` - Area in hectares
    ///
    /// # Returns
    /// * `Ok(Estimate)` - Bounds scaled to the area
    /// * `Err(ApiError)` - If the request fails
    async fn estimate(&self, crop: &str, area_ha: f64) -> ApiResult<Estimate>;
}
