//! Crop-disease image analysis.

use async_trait::async_trait;

use crate::backend::error::ApiResult;
use crate::models::{Diagnosis, ImageUpload};

#[async_trait]
pub trait DoctorBackend: Send + Sync {
    /// Send a photo for analysis.
    ///
    /// # Arguments
    /// * `image` - Raw photo bytes, sent as the multipart field `image`
    ///
    /// # Returns
    /// * `Ok(Diagnosis)` - The model's verdict
    /// * `Err(ApiError)` - Upload rejected or analysis unavailable
    async fn analyze(&self, image: &ImageUpload) -> ApiResult<Diagnosis>;
}
